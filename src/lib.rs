#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Tree-structured Parzen Estimator (TPE) sampling for black-box
//! hyperparameter optimization.
//!
//! The crate provides the sampling side of an optimization loop: given the
//! history of past trials, [`TpeSampler`] proposes the next value of each
//! parameter. Trial bookkeeping stays with the caller behind the [`Storage`]
//! trait; [`MemoryStorage`] is a ready-made in-memory implementation.
//!
//! # Getting Started
//!
//! ```
//! use tpe_sampler::prelude::*;
//!
//! let storage = MemoryStorage::new(Direction::Minimize);
//! let sampler = TpeSampler::builder().seed(0).build().unwrap();
//! let x_dist = Distribution::uniform(-10.0, 10.0).unwrap();
//! let n_dist = Distribution::int_uniform(1, 8).unwrap();
//!
//! for _ in 0..30 {
//!     let trial = storage.create_trial();
//!     let x = sampler.sample_independent(&storage, &trial, "x", &x_dist).unwrap();
//!     let n = sampler.sample_independent(&storage, &trial, "n", &n_dist).unwrap();
//!     let value = (x.as_float().unwrap() - 3.0).powi(2) + n.as_int().unwrap() as f64;
//!
//!     let mut done = trial
//!         .with_param("x", x, x_dist.clone())
//!         .with_param("n", n, n_dist.clone())
//!         .with_value(value);
//!     done.state = TrialState::Complete;
//!     storage.update(done);
//! }
//!
//! let best = storage.best_trial().unwrap().unwrap();
//! println!("best value {:?} with {:?}", best.value, best.params);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Distribution`] | The domain of one parameter (uniform, log, stepped, integer, categorical). |
//! | [`FrozenTrial`] | Read-only record of a past trial: state, value, parameters, intermediate reports. |
//! | [`Storage`] | Source of the trial history; samplers never own it. |
//! | [`Sampler`](sampler::Sampler) | Strategy for choosing the next parameter values. |
//! | [`Direction`] | Whether the objective is minimized or maximized. |
//!
//! # Samplers
//!
//! | Sampler | Algorithm |
//! |---------|-----------|
//! | [`TpeSampler`](sampler::TpeSampler) | Tree-structured Parzen Estimator |
//! | [`RandomSampler`](sampler::RandomSampler) | Uniform random, used for the TPE start-up phase |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on distributions, values and trial records | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key sampling points | on |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

mod distribution;
mod error;
mod kde;
mod param;
pub mod sampler;
pub mod storage;
mod trial;
mod types;

pub use distribution::{CategoricalChoice, Distribution};
pub use error::{Error, Result};
pub use param::ParamValue;
pub use sampler::{RandomSampler, Sampler, SearchSpace, TpeSampler, TpeSamplerBuilder};
pub use storage::{MemoryStorage, Storage};
pub use trial::FrozenTrial;
pub use types::{Direction, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use tpe_sampler::prelude::*;
/// ```
pub mod prelude {
    pub use crate::distribution::{CategoricalChoice, Distribution};
    pub use crate::error::{Error, Result};
    pub use crate::param::ParamValue;
    pub use crate::sampler::tpe::{
        ObservationPair, default_gamma, default_weights, hyperopt_default_gamma, uniform_weights,
    };
    pub use crate::sampler::{RandomSampler, Sampler, SearchSpace, TpeSampler, TpeSamplerBuilder};
    pub use crate::storage::{MemoryStorage, Storage};
    pub use crate::trial::FrozenTrial;
    pub use crate::types::{Direction, TrialState};
}
