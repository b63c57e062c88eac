//! Integration tests for relative (multivariate) TPE sampling.

use tpe_sampler::prelude::*;

use crate::fixtures::{PARAM, complete_history, float, optimize, running_trial};

fn multivariate_sampler(seed: u64) -> TpeSampler {
    TpeSampler::builder()
        .multivariate(true)
        .n_startup_trials(5)
        .seed(seed)
        .build()
        .unwrap()
}

fn mixed_space() -> SearchSpace {
    [
        ("x".to_owned(), Distribution::uniform(-2.0, 2.0).unwrap()),
        ("n".to_owned(), Distribution::int_uniform(1, 10).unwrap()),
        ("opt".to_owned(), Distribution::categorical(["sgd", "adam"]).unwrap()),
    ]
    .into_iter()
    .collect()
}

fn mixed_history(n: u64) -> MemoryStorage {
    let space = mixed_space();
    let mut names: Vec<&String> = space.keys().collect();
    names.sort();
    let random = RandomSampler::with_seed(17);
    let trials = (0..n)
        .map(|i| {
            let mut trial = FrozenTrial::new(i, TrialState::Complete).with_value(i as f64);
            for &name in &names {
                let dist = &space[name];
                trial = trial.with_param(name.as_str(), random.sample(dist), dist.clone());
            }
            trial
        })
        .collect();
    MemoryStorage::with_trials(Direction::Minimize, trials)
}

#[test]
fn test_relative_sampling_waits_for_startup() {
    let dist = Distribution::uniform(1.0, 100.0).unwrap();
    let space: SearchSpace = [(PARAM.to_owned(), dist.clone())].into_iter().collect();
    let sampler = multivariate_sampler(0);

    let storage = complete_history(4, &dist, 0);
    let params = sampler
        .sample_relative(&storage, &running_trial(4), &space)
        .unwrap();
    assert!(params.is_empty());

    let storage = complete_history(7, &dist, 0);
    let params = sampler
        .sample_relative(&storage, &running_trial(7), &space)
        .unwrap();
    assert_eq!(params.len(), 1);
    assert!(dist.contains(&params[PARAM]));
}

#[test]
fn test_empty_search_space_samples_nothing() {
    let storage = mixed_history(10);
    let params = multivariate_sampler(0)
        .sample_relative(&storage, &running_trial(10), &SearchSpace::new())
        .unwrap();
    assert!(params.is_empty());
}

#[test]
fn test_inferred_space_is_best_trial_distributions() {
    let storage = mixed_history(3);
    let space = multivariate_sampler(0)
        .infer_relative_search_space(&storage, &running_trial(3))
        .unwrap();
    assert_eq!(space, mixed_space());
}

#[test]
fn test_inferred_space_is_empty_when_not_applicable() {
    let trial = running_trial(0);

    // Fewer than two trials.
    let storage = mixed_history(1);
    assert!(
        multivariate_sampler(0)
            .infer_relative_search_space(&storage, &trial)
            .unwrap()
            .is_empty()
    );

    // Independent mode.
    let storage = mixed_history(5);
    let independent = TpeSampler::builder().seed(0).build().unwrap();
    assert!(
        independent
            .infer_relative_search_space(&storage, &trial)
            .unwrap()
            .is_empty()
    );

    // No completed trial to take the space from.
    let storage = MemoryStorage::with_trials(
        Direction::Minimize,
        vec![
            FrozenTrial::new(0, TrialState::Pruned),
            FrozenTrial::new(1, TrialState::Fail),
        ],
    );
    assert!(
        multivariate_sampler(0)
            .infer_relative_search_space(&storage, &trial)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_relative_sampling_covers_mixed_space() {
    let storage = mixed_history(12);
    let space = mixed_space();
    let sampler = multivariate_sampler(3);
    for _ in 0..30 {
        let params = sampler
            .sample_relative(&storage, &running_trial(12), &space)
            .unwrap();
        assert_eq!(params.len(), space.len());
        for (name, dist) in &space {
            assert!(dist.contains(&params[name]), "{name} = {:?}", params[name]);
        }
    }
}

#[test]
fn test_relative_sampling_is_deterministic() {
    let storage = mixed_history(12);
    let space = mixed_space();
    let a = multivariate_sampler(9)
        .sample_relative(&storage, &running_trial(12), &space)
        .unwrap();
    let b = multivariate_sampler(9)
        .sample_relative(&storage, &running_trial(12), &space)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_multivariate_optimizes_sphere() {
    let sampler = multivariate_sampler(42);
    let storage = MemoryStorage::new(Direction::Minimize);
    let space = [
        ("x", Distribution::uniform(-5.0, 5.0).unwrap()),
        ("y", Distribution::uniform(-5.0, 5.0).unwrap()),
    ];

    let best = optimize(&sampler, &storage, &space, 80, |t| {
        float(t, "x").powi(2) + float(t, "y").powi(2)
    });

    assert!(best < 5.0, "best value {best} should be < 5.0");
}
