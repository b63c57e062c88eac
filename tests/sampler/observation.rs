//! Observation extraction through the public storage-backed API.

use tpe_sampler::prelude::*;
use tpe_sampler::sampler::tpe::{multivariate_observation_pairs, observation_pairs};

fn scenario(direction: Direction) -> MemoryStorage {
    let dist = Distribution::int_uniform(0, 10).unwrap();
    let x = || ParamValue::Int(5);
    MemoryStorage::with_trials(
        direction,
        vec![
            FrozenTrial::new(0, TrialState::Complete)
                .with_value(5.0)
                .with_param("x", x(), dist.clone()),
            FrozenTrial::new(1, TrialState::Pruned)
                .with_param("x", x(), dist.clone())
                .with_intermediate_value(4, 1.0)
                .with_intermediate_value(7, 2.0),
            FrozenTrial::new(2, TrialState::Pruned)
                .with_param("x", x(), dist.clone())
                .with_intermediate_value(3, f64::NAN),
            FrozenTrial::new(3, TrialState::Pruned).with_param("x", x(), dist.clone()),
            FrozenTrial::new(4, TrialState::Fail).with_param("x", x(), dist),
        ],
    )
}

#[test]
fn test_extraction_when_minimizing() {
    let obs = observation_pairs(&scenario(Direction::Minimize), "x").unwrap();
    assert_eq!(obs.values, vec![Some(5.0); 4]);
    let expected: Vec<ObservationPair> = vec![
        (f64::NEG_INFINITY, 5.0).into(),
        (-7.0, 2.0).into(),
        (-3.0, f64::INFINITY).into(),
        (f64::INFINITY, 0.0).into(),
    ];
    assert_eq!(obs.pairs, expected);
}

#[test]
fn test_extraction_when_maximizing() {
    let obs = observation_pairs(&scenario(Direction::Maximize), "x").unwrap();
    assert_eq!(obs.values, vec![Some(5.0); 4]);
    let expected: Vec<ObservationPair> = vec![
        (f64::NEG_INFINITY, -5.0).into(),
        (-7.0, -2.0).into(),
        (-3.0, f64::INFINITY).into(),
        (f64::INFINITY, 0.0).into(),
    ];
    assert_eq!(obs.pairs, expected);
}

#[test]
fn test_multivariate_extraction_aligns_columns() {
    let obs = multivariate_observation_pairs(&scenario(Direction::Minimize), &["x", "y"]).unwrap();
    assert_eq!(obs.pairs.len(), 4);
    assert_eq!(obs.values["x"], vec![Some(5.0); 4]);
    assert_eq!(obs.values["y"], vec![None; 4]);
}

#[test]
fn test_pairs_order_completed_before_pruned() {
    let obs = observation_pairs(&scenario(Direction::Minimize), "x").unwrap();
    let mut ranked = obs.pairs.clone();
    ranked.sort_by(ObservationPair::total_cmp);
    assert_eq!(ranked, obs.pairs);
}
