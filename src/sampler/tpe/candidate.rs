//! Candidate generation and expected-improvement selection.
//!
//! For one parameter, `n_ei_candidates` values are drawn from the "good"
//! estimator `l(x)` and the one maximizing `log l(x) - log g(x)` wins. Ties go
//! to the earliest candidate.
//!
//! Numeric domains are modelled in a transformed space:
//!
//! | Distribution | Model space |
//! |--------------|-------------|
//! | uniform | `[low, high]` |
//! | log-uniform | `[ln low, ln high]` |
//! | discrete / int with step `q` | `[-q/2, high - low + q/2]`, quantized by `q` |
//! | int log-uniform | `[ln(low - 0.5), ln(high + 0.5)]` |

use rand::Rng;

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::kde::{CategoricalEstimator, ParzenEstimator, ParzenEstimatorParameters};
use crate::param::ParamValue;

use super::weights::{WeightsFn, checked_weights};

/// Observed values of one group together with their weights.
#[derive(Clone, Debug, Default)]
pub(crate) struct Weighted {
    pub(crate) values: Vec<f64>,
    pub(crate) weights: Vec<f64>,
}

impl Weighted {
    /// Attaches `weights(values.len())` to `values`.
    pub(crate) fn new(values: Vec<f64>, weights: &WeightsFn) -> Result<Self> {
        let weights = checked_weights(weights, values.len())?;
        Ok(Self { values, weights })
    }

    /// Maps each value through `f`, dropping it (and its weight) on `None`.
    fn filter_map(&self, mut f: impl FnMut(f64) -> Option<f64>) -> (Vec<f64>, Vec<f64>) {
        self.values
            .iter()
            .zip(&self.weights)
            .filter_map(|(&v, &w)| f(v).map(|x| (x, w)))
            .unzip()
    }
}

/// Settings that shape the estimators and the candidate search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CandidateSettings {
    pub(crate) parzen: ParzenEstimatorParameters,
    pub(crate) n_ei_candidates: usize,
}

/// Samples a value for `name` from the good/bad split of its history.
///
/// Values outside the distribution's bounds are ignored.
pub(crate) fn sample_param<R: Rng + ?Sized>(
    rng: &mut R,
    name: &str,
    distribution: &Distribution,
    good: &Weighted,
    bad: &Weighted,
    settings: &CandidateSettings,
) -> Result<ParamValue> {
    distribution
        .validate()
        .map_err(|e| Error::UnsupportedDistribution {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;
    if let Some(value) = distribution.single_value() {
        return Ok(value);
    }

    if let Some(n_choices) = distribution.n_choices() {
        let index = sample_categorical(rng, n_choices, good, bad, settings);
        return Ok(ParamValue::Categorical(index));
    }

    let Some(domain) = ModelDomain::of(distribution) else {
        return Err(Error::UnsupportedDistribution {
            name: name.to_owned(),
            reason: format!("no numeric model for a {} distribution", distribution.kind()),
        });
    };
    let x = sample_numerical(rng, &domain, good, bad, settings);
    Ok(below_open_bound(
        distribution,
        distribution.from_internal(domain.to_internal(x)),
    ))
}

/// Keeps continuous draws inside `[low, high)`; the exp of a log-space value
/// just below `ln high` can round up to `high`.
fn below_open_bound(distribution: &Distribution, value: ParamValue) -> ParamValue {
    match (distribution, value) {
        (
            Distribution::Uniform { high, .. } | Distribution::LogUniform { high, .. },
            ParamValue::Float(v),
        ) if v >= *high => ParamValue::Float(high.next_down()),
        (_, value) => value,
    }
}

/// Bounds and transform of a numeric distribution in model space.
#[derive(Clone, Copy, Debug)]
struct ModelDomain {
    low: f64,
    high: f64,
    q: Option<f64>,
    /// Subtracted from internal values (shifted quantized domains).
    offset: f64,
    log: bool,
    /// Inclusive bounds of accepted internal values.
    accept: (f64, f64),
}

impl ModelDomain {
    #[allow(clippy::cast_precision_loss)]
    fn of(distribution: &Distribution) -> Option<Self> {
        let accept = distribution.bounds()?;
        let domain = match *distribution {
            Distribution::Uniform { low, high } => Self {
                low,
                high,
                q: None,
                offset: 0.0,
                log: false,
                accept,
            },
            Distribution::LogUniform { low, high } => Self {
                low: low.ln(),
                high: high.ln(),
                q: None,
                offset: 0.0,
                log: true,
                accept,
            },
            Distribution::DiscreteUniform { .. } | Distribution::IntUniform { .. } => {
                Self::shifted(accept.0, accept.1, distribution.step()?, accept)
            }
            Distribution::IntLogUniform { low, high } => Self {
                low: (low as f64 - 0.5).ln(),
                high: (high as f64 + 0.5).ln(),
                q: None,
                offset: 0.0,
                log: true,
                accept,
            },
            Distribution::Categorical { .. } => return None,
        };
        Some(domain)
    }

    fn shifted(low: f64, high: f64, q: f64, accept: (f64, f64)) -> Self {
        Self {
            low: -0.5 * q,
            high: high - low + 0.5 * q,
            q: Some(q),
            offset: low,
            log: false,
            accept,
        }
    }

    fn to_model(&self, value: f64) -> Option<f64> {
        if !(self.accept.0..=self.accept.1).contains(&value) {
            return None;
        }
        Some(if self.log { value.ln() } else { value - self.offset })
    }

    fn to_internal(&self, x: f64) -> f64 {
        if self.log { x.exp() } else { x + self.offset }
    }
}

fn sample_numerical<R: Rng + ?Sized>(
    rng: &mut R,
    domain: &ModelDomain,
    good: &Weighted,
    bad: &Weighted,
    settings: &CandidateSettings,
) -> f64 {
    let (good_mus, good_weights) = good.filter_map(|v| domain.to_model(v));
    let (bad_mus, bad_weights) = bad.filter_map(|v| domain.to_model(v));

    let l = ParzenEstimator::new(
        &good_mus,
        &good_weights,
        domain.low,
        domain.high,
        domain.q,
        &settings.parzen,
    );
    let g = ParzenEstimator::new(
        &bad_mus,
        &bad_weights,
        domain.low,
        domain.high,
        domain.q,
        &settings.parzen,
    );

    let candidates: Vec<f64> = (0..settings.n_ei_candidates).map(|_| l.sample(rng)).collect();
    let best = argmax(candidates.iter().map(|&x| l.log_pdf(x) - g.log_pdf(x)));
    candidates.get(best).copied().unwrap_or(0.5 * (domain.low + domain.high))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn sample_categorical<R: Rng + ?Sized>(
    rng: &mut R,
    n_choices: usize,
    good: &Weighted,
    bad: &Weighted,
    settings: &CandidateSettings,
) -> usize {
    let in_range = |v: f64| (v >= 0.0 && v < n_choices as f64).then_some(v);
    let indices = |group: &Weighted| {
        let (values, weights) = group.filter_map(in_range);
        let indices: Vec<usize> = values.iter().map(|v| v.round() as usize).collect();
        (indices, weights)
    };
    let (good_indices, good_weights) = indices(good);
    let (bad_indices, bad_weights) = indices(bad);

    let prior_weight = settings.parzen.prior_weight;
    let l = CategoricalEstimator::new(&good_indices, &good_weights, n_choices, prior_weight);
    let g = CategoricalEstimator::new(&bad_indices, &bad_weights, n_choices, prior_weight);

    let candidates: Vec<usize> = (0..settings.n_ei_candidates).map(|_| l.sample(rng)).collect();
    let best = argmax(candidates.iter().map(|&c| l.log_pdf(c) - g.log_pdf(c)));
    candidates.get(best).copied().unwrap_or(0)
}

/// Index of the largest score; the first one wins ties and NaN never wins.
fn argmax(scores: impl Iterator<Item = f64>) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, score) in scores.enumerate() {
        if score > best.1 {
            best = (i, score);
        }
    }
    best.0
}
