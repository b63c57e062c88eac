//! Tree-structured Parzen Estimator (TPE) sampling.
//!
//! TPE models `P(x | y)` instead of `P(y | x)`. It ranks the trial history,
//! splits it into a small "good" group and the rest, fits a Parzen estimator
//! to each and proposes the candidate maximizing `l(x) / g(x)`, which is
//! proportional to expected improvement.
//!
//! # Pieces
//!
//! | Item | Role |
//! |------|------|
//! | [`observation_pairs`], [`multivariate_observation_pairs`] | Ranking keys and values extracted from the history |
//! | [`default_gamma`], [`hyperopt_default_gamma`], [`fixed_fraction_gamma`] | Size of the good group |
//! | [`default_weights`], [`uniform_weights`] | Per-observation weights |
//! | [`TpeSampler`] | Independent and relative sampling on top of the above |
//!
//! Pruned trials take part in the ranking: they always rank after completed
//! trials, and trials pruned later rank before trials pruned earlier.
//!
//! # Examples
//!
//! A minimal optimization loop over an in-memory history:
//!
//! ```
//! use tpe_sampler::prelude::*;
//!
//! let storage = MemoryStorage::new(Direction::Minimize);
//! let sampler = TpeSampler::builder().n_startup_trials(5).seed(42).build().unwrap();
//! let dist = Distribution::uniform(-10.0, 10.0).unwrap();
//!
//! for _ in 0..20 {
//!     let trial = storage.create_trial();
//!     let x = sampler
//!         .sample_independent(&storage, &trial, "x", &dist)
//!         .unwrap()
//!         .as_float()
//!         .unwrap();
//!     let mut done = trial.with_param("x", ParamValue::Float(x), dist.clone());
//!     done.state = TrialState::Complete;
//!     done.value = Some((x - 3.0).powi(2));
//!     storage.update(done);
//! }
//!
//! assert!(storage.best_trial().unwrap().is_some());
//! ```

mod candidate;
mod gamma;
mod observation;
mod sampler;
mod weights;

pub use gamma::{GammaFn, default_gamma, fixed_fraction_gamma, hyperopt_default_gamma};
pub use observation::{
    MultivariateObservations, ObservationPair, Observations, multivariate_observation_pairs,
    observation_pairs,
};
pub use sampler::{TpeSampler, TpeSamplerBuilder};
pub use weights::{WeightsFn, default_weights, uniform_weights};
