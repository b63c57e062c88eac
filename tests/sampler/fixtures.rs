//! Shared histories, a call-counting sampler and a minimal optimization driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tpe_sampler::prelude::*;

pub const PARAM: &str = "param-a";

/// `n` trials over `dist`, each in the state chosen by `state`.
///
/// Complete trials get a random final value, pruned trials a random report at
/// step `number`. Parameter values come from a seeded random sampler.
pub fn history(
    n: u64,
    dist: &Distribution,
    seed: u64,
    state: impl Fn(u64) -> TrialState,
) -> Vec<FrozenTrial> {
    let random = RandomSampler::with_seed(seed);
    let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(1));
    (0..n)
        .map(|number| {
            let state = state(number);
            let trial = FrozenTrial::new(number, state).with_param(
                PARAM,
                random.sample(dist),
                dist.clone(),
            );
            match state {
                TrialState::Complete => trial.with_value(rng.f64()),
                TrialState::Pruned => trial.with_intermediate_value(number, rng.f64()),
                _ => trial,
            }
        })
        .collect()
}

pub fn complete_history(n: u64, dist: &Distribution, seed: u64) -> MemoryStorage {
    MemoryStorage::with_trials(
        Direction::Minimize,
        history(n, dist, seed, |_| TrialState::Complete),
    )
}

pub fn running_trial(number: u64) -> FrozenTrial {
    FrozenTrial::new(number, TrialState::Running)
}

/// Counts `sample_independent` calls and delegates to a random sampler.
pub struct CountingSampler {
    calls: Arc<AtomicUsize>,
    inner: RandomSampler,
}

impl CountingSampler {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let sampler = Self {
            calls: Arc::clone(&calls),
            inner: RandomSampler::with_seed(0),
        };
        (sampler, calls)
    }
}

impl Sampler for CountingSampler {
    fn sample_independent(
        &self,
        storage: &dyn Storage,
        trial: &FrozenTrial,
        name: &str,
        distribution: &Distribution,
    ) -> Result<ParamValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sample_independent(storage, trial, name, distribution)
    }
}

/// Runs `n_trials` trials against `storage`, relative phase first, and
/// returns the best value.
pub fn optimize(
    sampler: &dyn Sampler,
    storage: &MemoryStorage,
    space: &[(&str, Distribution)],
    n_trials: usize,
    objective: impl Fn(&FrozenTrial) -> f64,
) -> f64 {
    for _ in 0..n_trials {
        let mut trial = storage.create_trial();
        let relative_space = sampler.infer_relative_search_space(storage, &trial).unwrap();
        let relative = sampler
            .sample_relative(storage, &trial, &relative_space)
            .unwrap();

        for (name, dist) in space {
            let value = match relative.get(*name) {
                Some(value) if relative_space.get(*name) == Some(dist) => value.clone(),
                _ => sampler
                    .sample_independent(storage, &trial, name, dist)
                    .unwrap(),
            };
            assert!(dist.contains(&value), "{name} = {value:?} outside {dist:?}");
            trial = trial.with_param(*name, value, dist.clone());
        }

        trial.value = Some(objective(&trial));
        trial.state = TrialState::Complete;
        storage.update(trial);
    }

    storage
        .best_trial()
        .unwrap()
        .and_then(|t| t.value)
        .expect("at least one completed trial")
}

pub fn float(trial: &FrozenTrial, name: &str) -> f64 {
    trial.param(name).and_then(ParamValue::as_float).unwrap()
}
