//! Weight functions: how much each observation counts.
//!
//! A weight function maps the number of observations `n` to `n` non-negative
//! weights, oldest observation first.

use std::sync::Arc;

use crate::error::{Error, Result};

use super::gamma::PROBE_LIMIT;

/// A pluggable weights function.
pub type WeightsFn = Arc<dyn Fn(usize) -> Vec<f64> + Send + Sync>;

/// Number of most recent observations that always get full weight.
const FLAT_WINDOW: usize = 25;

/// Every observation has weight 1.
#[must_use]
pub fn uniform_weights(n: usize) -> Vec<f64> {
    vec![1.0; n]
}

/// Full weight for the newest 25 observations, a linear ramp from `1/n` up to
/// 1 for the older ones.
///
/// # Examples
///
/// ```
/// use tpe_sampler::sampler::tpe::default_weights;
///
/// assert_eq!(default_weights(3), vec![1.0, 1.0, 1.0]);
/// let w = default_weights(30);
/// assert!(w[0] < w[4]);
/// assert!(w[5..].iter().all(|&x| x == 1.0));
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn default_weights(n: usize) -> Vec<f64> {
    if n < FLAT_WINDOW {
        return uniform_weights(n);
    }
    let n_ramp = n - FLAT_WINDOW;
    let start = 1.0 / n as f64;
    let mut weights: Vec<f64> = match n_ramp {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n_ramp)
            .map(|i| start + (1.0 - start) * i as f64 / (n_ramp - 1) as f64)
            .collect(),
    };
    weights.extend(core::iter::repeat_n(1.0, FLAT_WINDOW));
    weights
}

/// Evaluates `weights` for `n` observations and checks its contract.
pub(crate) fn checked_weights(weights: &WeightsFn, n: usize) -> Result<Vec<f64>> {
    let w = weights(n);
    if w.len() != n {
        return Err(Error::Configuration(format!(
            "weights({n}) returned {} weights",
            w.len()
        )));
    }
    if let Some(bad) = w.iter().find(|x| !x.is_finite() || **x < 0.0) {
        return Err(Error::Configuration(format!(
            "weights({n}) returned the invalid weight {bad}"
        )));
    }
    Ok(w)
}

/// Checks the weights contract on `0..=PROBE_LIMIT`.
pub(crate) fn probe_weights(weights: &WeightsFn) -> Result<()> {
    (0..=PROBE_LIMIT).try_for_each(|n| checked_weights(weights, n).map(|_| ()))
}
