//! Turning trial history into ranked observations.
//!
//! Every usable trial contributes one [`ObservationPair`] that ranks it
//! against the others, plus its value for each parameter of interest.
//! Trials that neither completed with a value nor were pruned carry no
//! ranking information and are skipped.
//!
//! | Trial | Pair |
//! |-------|------|
//! | complete with value `v` | `(-inf, sign * v)` |
//! | pruned, last report `v` at step `s` | `(-s, sign * v)` |
//! | pruned, no reports | `(+inf, 0)` |
//!
//! `sign` is `+1` when minimizing and `-1` when maximizing. A NaN objective
//! ranks as `+inf` (worst) regardless of direction.

use core::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::storage::Storage;
use crate::trial::FrozenTrial;
use crate::types::{Direction, TrialState};

/// Ranking key of one trial: lower sorts better.
///
/// The first component is the progress key (completed trials before pruned
/// ones, later pruning before earlier pruning), the second the signed loss.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationPair {
    /// `-inf` for completed trials, `-step` for pruned ones, `+inf` without reports.
    pub progress: f64,
    /// The direction-adjusted objective value.
    pub loss: f64,
}

impl ObservationPair {
    /// Creates a pair.
    #[must_use]
    pub const fn new(progress: f64, loss: f64) -> Self {
        Self { progress, loss }
    }

    /// Lexicographic total order on `(progress, loss)`.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.progress
            .total_cmp(&other.progress)
            .then_with(|| self.loss.total_cmp(&other.loss))
    }
}

impl From<(f64, f64)> for ObservationPair {
    fn from((progress, loss): (f64, f64)) -> Self {
        Self::new(progress, loss)
    }
}

/// Observations of one parameter.
///
/// `values[i]` and `pairs[i]` describe the same trial. A value is `None` when
/// the trial did not use the parameter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observations {
    /// Parameter values in internal representation.
    pub values: Vec<Option<f64>>,
    /// Ranking keys.
    pub pairs: Vec<ObservationPair>,
}

/// Observations of several parameters sharing one list of ranking keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultivariateObservations {
    /// Per-parameter values, each aligned with `pairs`.
    pub values: HashMap<String, Vec<Option<f64>>>,
    /// Ranking keys.
    pub pairs: Vec<ObservationPair>,
}

/// Extracts the observations of parameter `name` from the storage history.
///
/// # Errors
///
/// Propagates storage errors and returns `Error::ParameterMismatch` when a
/// recorded value does not fit the distribution it was recorded with.
///
/// # Examples
///
/// ```
/// use tpe_sampler::sampler::tpe::{ObservationPair, observation_pairs};
/// use tpe_sampler::{Direction, Distribution, FrozenTrial, MemoryStorage, ParamValue, TrialState};
///
/// let dist = Distribution::int_uniform(0, 10).unwrap();
/// let storage = MemoryStorage::with_trials(
///     Direction::Minimize,
///     vec![
///         FrozenTrial::new(0, TrialState::Complete)
///             .with_value(3.0)
///             .with_param("x", ParamValue::Int(4), dist.clone()),
///         FrozenTrial::new(1, TrialState::Fail).with_param("x", ParamValue::Int(1), dist),
///     ],
/// );
///
/// let obs = observation_pairs(&storage, "x").unwrap();
/// assert_eq!(obs.values, vec![Some(4.0)]);
/// assert_eq!(obs.pairs, vec![ObservationPair::new(f64::NEG_INFINITY, 3.0)]);
/// ```
pub fn observation_pairs(storage: &dyn Storage, name: &str) -> Result<Observations> {
    let trials = storage.get_all_trials()?;
    extract(&trials, storage.direction(), name)
}

/// Extracts the observations of several parameters from the storage history.
///
/// Every column of [`MultivariateObservations::values`] is aligned with the
/// shared `pairs`.
///
/// # Errors
///
/// Same as [`observation_pairs`].
pub fn multivariate_observation_pairs(
    storage: &dyn Storage,
    names: &[&str],
) -> Result<MultivariateObservations> {
    let trials = storage.get_all_trials()?;
    extract_multivariate(&trials, storage.direction(), names)
}

/// Extracts the observations of one parameter from a history snapshot.
pub(crate) fn extract(
    trials: &[FrozenTrial],
    direction: Direction,
    name: &str,
) -> Result<Observations> {
    let sign = direction.sign();
    let mut observations = Observations::default();
    for trial in trials {
        let Some(pair) = observation_pair(trial, sign) else {
            continue;
        };
        observations.values.push(internal_value(trial, name)?);
        observations.pairs.push(pair);
    }
    Ok(observations)
}

/// Extracts the observations of several parameters from a history snapshot.
pub(crate) fn extract_multivariate(
    trials: &[FrozenTrial],
    direction: Direction,
    names: &[&str],
) -> Result<MultivariateObservations> {
    let sign = direction.sign();
    let mut observations = MultivariateObservations {
        values: names.iter().map(|&n| (n.to_owned(), Vec::new())).collect(),
        pairs: Vec::new(),
    };
    for trial in trials {
        let Some(pair) = observation_pair(trial, sign) else {
            continue;
        };
        for &name in names {
            let value = internal_value(trial, name)?;
            if let Some(column) = observations.values.get_mut(name) {
                column.push(value);
            }
        }
        observations.pairs.push(pair);
    }
    Ok(observations)
}

/// Splits observation indices into the best `n_good` and the rest.
///
/// Ranking uses a stable sort on the pairs, so ties keep trial order. Both
/// halves are returned in trial order.
pub(crate) fn split_indices(pairs: &[ObservationPair], n_good: usize) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..pairs.len()).collect();
    order.sort_by(|&a, &b| pairs[a].total_cmp(&pairs[b]));

    let n_good = n_good.min(order.len());
    let mut bad = order.split_off(n_good);
    let mut good = order;
    good.sort_unstable();
    bad.sort_unstable();
    (good, bad)
}

/// Values at `indices`, skipping trials that did not use the parameter.
pub(crate) fn select_values(values: &[Option<f64>], indices: &[usize]) -> Vec<f64> {
    indices.iter().filter_map(|&i| values.get(i).copied().flatten()).collect()
}

#[allow(clippy::cast_precision_loss)]
fn observation_pair(trial: &FrozenTrial, sign: f64) -> Option<ObservationPair> {
    match trial.state {
        TrialState::Complete => trial
            .value
            .map(|v| ObservationPair::new(f64::NEG_INFINITY, signed_loss(v, sign))),
        TrialState::Pruned => Some(match trial.last_step() {
            Some((step, v)) => ObservationPair::new(-(step as f64), signed_loss(v, sign)),
            None => ObservationPair::new(f64::INFINITY, 0.0),
        }),
        TrialState::Fail | TrialState::Running | TrialState::Waiting => None,
    }
}

fn signed_loss(value: f64, sign: f64) -> f64 {
    if value.is_nan() { f64::INFINITY } else { sign * value }
}

#[allow(clippy::cast_precision_loss)]
fn internal_value(trial: &FrozenTrial, name: &str) -> Result<Option<f64>> {
    let Some(value) = trial.param(name) else {
        return Ok(None);
    };
    match trial.distributions.get(name) {
        Some(distribution) => distribution.to_internal(value).map(Some).ok_or_else(|| {
            Error::ParameterMismatch {
                name: name.to_owned(),
                reason: format!(
                    "trial {} recorded {value:?} for a {} distribution",
                    trial.number,
                    distribution.kind()
                ),
            }
        }),
        None => Ok(Some(match value {
            ParamValue::Float(v) => *v,
            ParamValue::Int(v) => *v as f64,
            ParamValue::Categorical(i) => *i as f64,
        })),
    }
}
