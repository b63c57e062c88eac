//! Gamma functions: how many observations count as "good".
//!
//! A gamma function maps the total number of observations `n` to the number
//! of best-ranked observations that feed the "good" density. Any
//! `Fn(usize) -> usize` returning a value in `0..=n` can be plugged in through
//! [`TpeSamplerBuilder::gamma`](super::TpeSamplerBuilder::gamma).
//!
//! | Function | Formula |
//! |----------|---------|
//! | [`default_gamma`] | `min(ceil(0.1 n), 25)` |
//! | [`hyperopt_default_gamma`] | `min(ceil(0.25 sqrt(n)), 25)` |
//! | [`fixed_fraction_gamma`] | `ceil(f n)` |
//!
//! # Examples
//!
//! ```
//! use tpe_sampler::sampler::tpe::{default_gamma, hyperopt_default_gamma};
//!
//! assert_eq!(default_gamma(10), 1);
//! assert_eq!(default_gamma(1000), 25);
//! assert_eq!(hyperopt_default_gamma(100), 3);
//! ```

use std::sync::Arc;

use crate::error::{Error, Result};

/// A pluggable gamma function.
pub type GammaFn = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// Largest `n` probed when a gamma function is validated at build time.
pub(crate) const PROBE_LIMIT: usize = 100;

/// Upper bound on the "good" set of the built-in functions.
const MAX_GOOD: usize = 25;

/// Keeps the best 10% of observations, at most 25.
#[must_use]
pub fn default_gamma(n: usize) -> usize {
    n.div_ceil(10).min(MAX_GOOD)
}

/// Hyperopt's rule: `ceil(0.25 * sqrt(n))`, at most 25.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn hyperopt_default_gamma(n: usize) -> usize {
    ((0.25 * (n as f64).sqrt()).ceil() as usize).min(MAX_GOOD)
}

/// Keeps a fixed fraction of the observations, rounded up.
///
/// # Errors
///
/// Returns `Error::InvalidGamma` if `fraction` is not in (0.0, 1.0).
///
/// # Examples
///
/// ```
/// use tpe_sampler::sampler::tpe::fixed_fraction_gamma;
///
/// let gamma = fixed_fraction_gamma(0.25).unwrap();
/// assert_eq!(gamma(20), 5);
/// assert!(fixed_fraction_gamma(1.5).is_err());
/// ```
pub fn fixed_fraction_gamma(
    fraction: f64,
) -> Result<impl Fn(usize) -> usize + Send + Sync + Copy + 'static> {
    if fraction.is_nan() || fraction <= 0.0 || fraction >= 1.0 {
        return Err(Error::InvalidGamma(fraction));
    }
    Ok(move |n| fraction_of(n, fraction))
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn fraction_of(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).ceil() as usize).min(n)
}

/// Evaluates `gamma` for `n` observations and checks `gamma(n) <= n`.
pub(crate) fn checked_gamma(gamma: &GammaFn, n: usize) -> Result<usize> {
    let n_good = gamma(n);
    if n_good > n {
        return Err(Error::Configuration(format!(
            "gamma({n}) returned {n_good}, which exceeds the number of observations"
        )));
    }
    Ok(n_good)
}

/// Checks the gamma contract on `0..=PROBE_LIMIT`.
pub(crate) fn probe_gamma(gamma: &GammaFn) -> Result<()> {
    (0..=PROBE_LIMIT).try_for_each(|n| checked_gamma(gamma, n).map(|_| ()))
}
