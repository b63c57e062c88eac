//! Error type shared by distributions, storages and samplers.

/// Everything that can go wrong while validating a domain, configuring a
/// sampler or sampling from a trial history.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low ({0}) must be positive for log scale")]
    InvalidLogBounds(f64),

    /// Returned when a step is not positive or does not divide the range.
    #[error("invalid step {step}: must be positive and divide the range {low}..={high}")]
    InvalidStep {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
        /// The offending step.
        step: f64,
    },

    /// Returned when categorical choices are empty.
    #[error("categorical choices cannot be empty")]
    EmptyChoices,

    /// Returned when a fixed gamma fraction is not in the open range (0.0, 1.0).
    #[error("invalid gamma: {0} must be in (0.0, 1.0)")]
    InvalidGamma(f64),

    /// Returned when the sampler is configured with arguments that violate
    /// their contract (e.g. a gamma function returning more than `n`).
    #[error("invalid sampler configuration: {0}")]
    Configuration(String),

    /// Returned when a distribution cannot be turned into a Parzen estimator.
    #[error("unsupported distribution for '{name}': {reason}")]
    UnsupportedDistribution {
        /// The parameter name.
        name: String,
        /// Why no estimator can be built.
        reason: String,
    },

    /// Returned when a recorded parameter value does not fit its distribution.
    #[error("parameter mismatch for '{name}': {reason}")]
    ParameterMismatch {
        /// The parameter name.
        name: String,
        /// Description of the mismatch.
        reason: String,
    },

    /// Returned when the trial store fails to produce its history.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
