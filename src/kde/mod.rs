//! Parzen estimators used by the TPE sampler.
//!
//! The sampler builds two estimators per parameter, one over the "good"
//! observations and one over the "bad" ones.
//!
//! - [`parzen`] - Truncated Gaussian mixture for numeric domains, optionally quantized
//! - [`categorical`] - Smoothed weighted histogram for categorical domains

mod categorical;
mod parzen;

pub(crate) use categorical::CategoricalEstimator;
pub(crate) use parzen::{ParzenEstimator, ParzenEstimatorParameters};
