use std::collections::HashSet;
use std::sync::atomic::Ordering;

use tpe_sampler::prelude::*;
use tpe_sampler::sampler::tpe::fixed_fraction_gamma;

use crate::fixtures::{
    CountingSampler, PARAM, complete_history, float, history, optimize, running_trial,
};

fn suggest(sampler: &TpeSampler, storage: &MemoryStorage, dist: &Distribution) -> ParamValue {
    sampler
        .sample_independent(storage, &running_trial(storage.len() as u64), PARAM, dist)
        .unwrap()
}

fn bits(value: &ParamValue) -> u64 {
    match value {
        ParamValue::Float(v) => v.to_bits(),
        ParamValue::Int(v) => *v as u64,
        ParamValue::Categorical(i) => *i as u64,
    }
}

#[test]
fn test_tpe_optimizes_quadratic_function() {
    // Minimize f(x) = (x - 3)^2 where x in [-10, 10]
    let sampler = TpeSampler::builder()
        .seed(42)
        .n_startup_trials(10)
        .build()
        .unwrap();
    let storage = MemoryStorage::new(Direction::Minimize);
    let space = [("x", Distribution::uniform(-10.0, 10.0).unwrap())];

    let best = optimize(&sampler, &storage, &space, 100, |t| (float(t, "x") - 3.0).powi(2));

    assert!(best < 1.0, "best value {best} should be < 1.0");
}

#[test]
fn test_tpe_maximization() {
    // Maximize f(x) = -(x - 2)^2 + 10 where x in [-10, 10]
    let sampler = TpeSampler::builder().seed(456).n_startup_trials(5).build().unwrap();
    let storage = MemoryStorage::new(Direction::Maximize);
    let space = [("x", Distribution::uniform(-10.0, 10.0).unwrap())];

    let best = optimize(&sampler, &storage, &space, 50, |t| -(float(t, "x") - 2.0).powi(2) + 10.0);

    assert!(best > 5.0, "best value {best} should be > 5.0");
}

#[test]
fn test_tpe_with_categorical_and_integer_parameters() {
    let sampler = TpeSampler::builder().seed(7).n_startup_trials(5).build().unwrap();
    let storage = MemoryStorage::new(Direction::Minimize);
    let space = [
        ("model", Distribution::categorical(["linear", "quadratic", "cubic"]).unwrap()),
        ("depth", Distribution::int_uniform(1, 10).unwrap()),
    ];

    let best = optimize(&sampler, &storage, &space, 40, |t| {
        let model = t.param("model").and_then(ParamValue::as_index).unwrap();
        let depth = t.param("depth").and_then(ParamValue::as_int).unwrap();
        let penalty = if model == 2 { 0.0 } else { 5.0 };
        penalty + (depth - 4).abs() as f64
    });

    assert!(best <= 2.0, "best value {best} should be <= 2.0");
}

#[test]
fn test_suggestions_respect_every_domain() {
    let cases = [
        Distribution::uniform(1.0, 100.0).unwrap(),
        Distribution::log_uniform(1.0, 100.0).unwrap(),
        Distribution::discrete_uniform(1.0, 100.0, 0.1).unwrap(),
        Distribution::int_uniform(1, 100).unwrap(),
        Distribution::int_uniform_with_step(0, 100, 10).unwrap(),
        Distribution::int_log_uniform(1, 100).unwrap(),
        Distribution::categorical(["a", "b", "c", "d"]).unwrap(),
    ];

    for dist in &cases {
        let storage = complete_history(10, dist, 3);
        let sampler = TpeSampler::builder().n_startup_trials(5).seed(0).build().unwrap();
        for _ in 0..100 {
            let value = suggest(&sampler, &storage, dist);
            assert!(dist.contains(&value), "{value:?} outside {dist:?}");

            match (dist, &value) {
                (Distribution::Uniform { .. }, ParamValue::Float(v)) => {
                    assert!((1.0..100.0).contains(v));
                }
                (Distribution::DiscreteUniform { .. }, ParamValue::Float(v)) => {
                    let off_grid = ((v * 10.0).round() - v * 10.0).abs();
                    assert!(off_grid < 1e-6, "{v} not on the 0.1 grid");
                }
                (Distribution::IntUniform { step: 10, .. }, ParamValue::Int(v)) => {
                    assert_eq!(v % 10, 0);
                }
                _ => {}
            }
        }
    }
}

#[test]
fn test_single_point_domains_return_the_constant() {
    let storage = MemoryStorage::new(Direction::Minimize);
    let sampler = TpeSampler::builder().seed(0).build().unwrap();
    let cases = [
        (Distribution::uniform(2.5, 2.5).unwrap(), ParamValue::Float(2.5)),
        (Distribution::log_uniform(4.0, 4.0).unwrap(), ParamValue::Float(4.0)),
        (Distribution::int_uniform(3, 3).unwrap(), ParamValue::Int(3)),
        (Distribution::int_log_uniform(8, 8).unwrap(), ParamValue::Int(8)),
        (Distribution::categorical(["only"]).unwrap(), ParamValue::Categorical(0)),
    ];
    for (dist, expected) in cases {
        assert_eq!(suggest(&sampler, &storage, &dist), expected);
    }
}

#[test]
fn test_same_seed_same_suggestion() {
    let dist = Distribution::uniform(1.0, 100.0).unwrap();
    let storage = complete_history(10, &dist, 1);

    let a = TpeSampler::builder().n_startup_trials(5).seed(0).build().unwrap();
    let b = TpeSampler::builder().n_startup_trials(5).seed(0).build().unwrap();
    let c = TpeSampler::builder().n_startup_trials(5).seed(1).build().unwrap();

    let suggestion = suggest(&a, &storage, &dist);
    assert_eq!(suggestion, suggest(&b, &storage, &dist));
    assert_ne!(suggestion, suggest(&c, &storage, &dist));
}

#[test]
fn test_startup_phase_delegates_to_fallback() {
    let dist = Distribution::uniform(1.0, 100.0).unwrap();

    let (fallback, calls) = CountingSampler::new();
    let sampler = TpeSampler::builder()
        .n_startup_trials(5)
        .seed(0)
        .fallback(fallback)
        .build()
        .unwrap();
    let _ = suggest(&sampler, &complete_history(4, &dist, 0), &dist);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let (fallback, calls) = CountingSampler::new();
    let sampler = TpeSampler::builder()
        .n_startup_trials(5)
        .seed(0)
        .fallback(fallback)
        .build()
        .unwrap();
    let _ = suggest(&sampler, &complete_history(7, &dist, 0), &dist);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_startup_counts_trials_in_any_state() {
    let dist = Distribution::uniform(1.0, 100.0).unwrap();
    let trials = history(6, &dist, 0, |_| TrialState::Fail);
    let storage = MemoryStorage::with_trials(Direction::Minimize, trials);

    let (fallback, calls) = CountingSampler::new();
    let sampler = TpeSampler::builder()
        .n_startup_trials(5)
        .seed(0)
        .fallback(fallback)
        .build()
        .unwrap();
    let value = suggest(&sampler, &storage, &dist);
    assert!(dist.contains(&value));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_fail_running_and_waiting_trials_are_ignored_alike() {
    let dist = Distribution::uniform(1.0, 100.0).unwrap();
    let mut suggestions = Vec::new();
    for ignored in [TrialState::Fail, TrialState::Running, TrialState::Waiting] {
        let trials = history(32, &dist, 128, |i| {
            if i < 16 { TrialState::Complete } else { ignored }
        });
        let storage = MemoryStorage::with_trials(Direction::Minimize, trials);
        let sampler = TpeSampler::builder().n_startup_trials(5).seed(0).build().unwrap();
        suggestions.push(suggest(&sampler, &storage, &dist));
    }
    assert_eq!(suggestions[0], suggestions[1]);
    assert_eq!(suggestions[1], suggestions[2]);
}

#[test]
fn test_complete_fail_and_pruned_histories_differ() {
    let dist = Distribution::uniform(1.0, 100.0).unwrap();
    let mut suggestions = HashSet::new();
    for state in [TrialState::Complete, TrialState::Fail, TrialState::Pruned] {
        let trials = history(32, &dist, 128, |_| state);
        let storage = MemoryStorage::with_trials(Direction::Minimize, trials);
        let sampler = TpeSampler::builder().n_startup_trials(5).seed(0).build().unwrap();
        suggestions.insert(bits(&suggest(&sampler, &storage, &dist)));
    }
    assert_eq!(suggestions.len(), 3);
}

#[test]
fn test_prior_settings_change_the_suggestion() {
    let dist = Distribution::uniform(1.0, 100.0).unwrap();
    let storage = complete_history(10, &dist, 11);

    let builders = [
        TpeSampler::builder(),
        TpeSampler::builder().consider_prior(false),
        TpeSampler::builder().prior_weight(0.5),
    ];
    // Compare runs of suggestions; a single draw can coincide when only the
    // mixture weights change.
    let suggestions: HashSet<Vec<u64>> = builders
        .into_iter()
        .map(|b| {
            let sampler = b.n_startup_trials(5).seed(0).build().unwrap();
            (0..20)
                .map(|_| bits(&suggest(&sampler, &storage, &dist)))
                .collect()
        })
        .collect();
    assert_eq!(suggestions.len(), 3);
}

#[test]
fn test_smoothing_options_keep_values_in_bounds() {
    let dist = Distribution::uniform(-5.0, 5.0).unwrap();
    let storage = complete_history(30, &dist, 5);
    for (magic_clip, endpoints) in [(true, true), (false, false), (false, true)] {
        let sampler = TpeSampler::builder()
            .consider_magic_clip(magic_clip)
            .consider_endpoints(endpoints)
            .n_startup_trials(5)
            .seed(2)
            .build()
            .unwrap();
        for _ in 0..50 {
            assert!(dist.contains(&suggest(&sampler, &storage, &dist)));
        }
    }
}

#[test]
fn test_custom_gamma_and_weights() {
    let dist = Distribution::int_uniform(0, 20).unwrap();
    let storage = complete_history(60, &dist, 8);

    let sampler = TpeSampler::builder()
        .gamma(fixed_fraction_gamma(0.3).unwrap())
        .weights(default_weights)
        .n_startup_trials(5)
        .seed(4)
        .build()
        .unwrap();
    for _ in 0..20 {
        assert!(dist.contains(&suggest(&sampler, &storage, &dist)));
    }

    let hyperopt = TpeSampler::hyperopt_parameters().seed(4).build().unwrap();
    assert!(dist.contains(&suggest(&hyperopt, &storage, &dist)));
}

#[test]
fn test_pruned_history_is_usable() {
    let dist = Distribution::log_uniform(1e-4, 1.0).unwrap();
    let trials = history(20, &dist, 3, |i| {
        if i % 2 == 0 { TrialState::Pruned } else { TrialState::Complete }
    });
    let storage = MemoryStorage::with_trials(Direction::Maximize, trials);
    let sampler = TpeSampler::builder().n_startup_trials(5).seed(1).build().unwrap();
    for _ in 0..20 {
        assert!(dist.contains(&suggest(&sampler, &storage, &dist)));
    }
}

#[test]
fn test_storage_errors_propagate() {
    struct Broken;
    impl Storage for Broken {
        fn direction(&self) -> Direction {
            Direction::Minimize
        }
        fn get_all_trials(&self) -> Result<Vec<FrozenTrial>> {
            Err(Error::Storage("connection lost".to_owned()))
        }
    }

    let sampler = TpeSampler::builder().seed(0).build().unwrap();
    let dist = Distribution::uniform(0.0, 1.0).unwrap();
    let err = sampler
        .sample_independent(&Broken, &running_trial(0), "x", &dist)
        .unwrap_err();
    assert!(matches!(err, Error::Storage(ref msg) if msg == "connection lost"));
}

#[test]
fn test_mismatched_history_is_reported() {
    let trials = vec![
        FrozenTrial::new(0, TrialState::Complete)
            .with_value(1.0)
            .with_param(PARAM, ParamValue::Int(2), Distribution::uniform(0.0, 5.0).unwrap()),
    ];
    let storage = MemoryStorage::with_trials(Direction::Minimize, trials);
    let sampler = TpeSampler::builder().n_startup_trials(0).seed(0).build().unwrap();
    let dist = Distribution::uniform(0.0, 5.0).unwrap();
    assert!(matches!(
        sampler.sample_independent(&storage, &running_trial(1), PARAM, &dist),
        Err(Error::ParameterMismatch { .. })
    ));
}

#[test]
fn test_concurrent_sampling_shares_one_sampler() {
    let dist = Distribution::uniform(0.0, 1.0).unwrap();
    let storage = complete_history(20, &dist, 6);
    let sampler = TpeSampler::builder().n_startup_trials(5).seed(3).build().unwrap();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..10 {
                    assert!(dist.contains(&suggest(&sampler, &storage, &dist)));
                }
            });
        }
    });
}
