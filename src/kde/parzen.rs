//! Truncated Gaussian mixture used as the Parzen estimator for numeric domains.
//!
//! Each observation becomes one Gaussian component centred on it. The
//! bandwidth of a component is the larger of the gaps to its sorted
//! neighbours, clipped into `[min_sigma, high - low]`. An optional prior
//! component sits at the middle of the domain with the domain width as its
//! bandwidth. The mixture is truncated to `[low, high]`.
//!
//! Quantized domains (discrete and integer distributions) carry a step `q`:
//! draws are snapped to the grid and densities become the probability mass of
//! the `q`-wide bucket around a point.

use core::f64::consts::{PI, SQRT_2};

use rand::Rng;
use statrs::function::erf::{erfc, erfc_inv};

/// Floor used for sigmas, probabilities and normalizers.
const EPS: f64 = 1e-12;

/// Upper bound on the number of components used by the magic clip.
const MAGIC_CLIP_CAP: f64 = 100.0;

/// Number of redraws before a draw that hit the upper bound is clamped.
const MAX_REJECTIONS: usize = 64;

/// Smoothing options shared by the good and bad estimators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ParzenEstimatorParameters {
    /// Add a prior component centred on the domain.
    pub(crate) consider_prior: bool,
    /// Weight of the prior component (before normalization).
    pub(crate) prior_weight: f64,
    /// Raise the minimum bandwidth with the number of components.
    pub(crate) consider_magic_clip: bool,
    /// Let the domain bounds act as neighbours of the outermost components.
    pub(crate) consider_endpoints: bool,
}

impl Default for ParzenEstimatorParameters {
    fn default() -> Self {
        Self {
            consider_prior: true,
            prior_weight: 1.0,
            consider_magic_clip: true,
            consider_endpoints: false,
        }
    }
}

/// A mixture of Gaussians truncated to `[low, high]`.
#[derive(Clone, Debug)]
pub(crate) struct ParzenEstimator {
    /// Normalized component weights, in the order of `mus`.
    weights: Vec<f64>,
    /// Component centres, sorted ascending.
    mus: Vec<f64>,
    /// Component bandwidths.
    sigmas: Vec<f64>,
    low: f64,
    high: f64,
    /// Grid spacing for quantized domains.
    q: Option<f64>,
}

impl ParzenEstimator {
    /// Builds an estimator from observations and their weights.
    ///
    /// `observations` and `observation_weights` must have the same length and
    /// the observations must lie in `[low, high]` with `low < high`. Without
    /// observations the prior component is always added.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(
        observations: &[f64],
        observation_weights: &[f64],
        low: f64,
        high: f64,
        q: Option<f64>,
        parameters: &ParzenEstimatorParameters,
    ) -> Self {
        debug_assert_eq!(observations.len(), observation_weights.len());
        debug_assert!(low < high);

        let consider_prior = parameters.consider_prior || observations.is_empty();
        let prior_mu = 0.5 * (low + high);
        let prior_sigma = high - low;

        let mut order: Vec<usize> = (0..observations.len()).collect();
        order.sort_by(|&a, &b| observations[a].total_cmp(&observations[b]));

        // (mu, weight); the prior goes in front of the first observation >= its mu.
        let mut components: Vec<(f64, f64)> = order
            .iter()
            .map(|&i| (observations[i], observation_weights[i]))
            .collect();
        let prior_pos = if consider_prior {
            let pos = components.partition_point(|&(mu, _)| mu < prior_mu);
            components.insert(pos, (prior_mu, parameters.prior_weight));
            Some(pos)
        } else {
            None
        };

        let mus: Vec<f64> = components.iter().map(|&(mu, _)| mu).collect();
        let mut sigmas = if observations.is_empty() {
            vec![prior_sigma]
        } else {
            neighbour_sigmas(&mus, low, high, parameters.consider_endpoints)
        };

        let max_sigma = high - low;
        let min_sigma = if parameters.consider_magic_clip {
            (high - low) / MAGIC_CLIP_CAP.min(1.0 + mus.len() as f64)
        } else {
            EPS
        };
        for sigma in &mut sigmas {
            *sigma = sigma.clamp(min_sigma, max_sigma);
        }
        if let Some(pos) = prior_pos {
            sigmas[pos] = prior_sigma;
        }

        let total: f64 = components.iter().map(|&(_, w)| w).sum();
        let weights = if total > 0.0 && total.is_finite() {
            components.iter().map(|&(_, w)| w / total).collect()
        } else {
            vec![1.0 / mus.len() as f64; mus.len()]
        };

        Self {
            weights,
            mus,
            sigmas,
            low,
            high,
            q,
        }
    }

    /// Draws one value: picks a component in proportion to its weight, then
    /// samples its Gaussian truncated to `[low, high)`.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let active = self.pick_component(rng);
        let (mu, sigma) = (self.mus[active], self.sigmas[active]);

        let mut x = self.high;
        for _ in 0..MAX_REJECTIONS {
            x = sample_truncated_normal(rng, mu, sigma, self.low, self.high);
            if x < self.high {
                break;
            }
        }
        let x = x.min(self.high.next_down());

        match self.q {
            Some(q) => (x / q).round_ties_even() * q,
            None => x,
        }
    }

    /// Log density of `x` under the truncated mixture.
    ///
    /// For quantized estimators this is the log probability of the bucket
    /// `[x - q/2, x + q/2]` clipped to the domain.
    pub(crate) fn log_pdf(&self, x: f64) -> f64 {
        let p_accept: f64 = self
            .components()
            .map(|(w, mu, sigma)| {
                w * (normal_cdf(self.high, mu, sigma) - normal_cdf(self.low, mu, sigma))
            })
            .sum();

        match self.q {
            None => {
                let terms: Vec<f64> = self
                    .components()
                    .map(|(w, mu, sigma)| {
                        let z = (x - mu) / sigma.max(EPS);
                        let coefficient = w / ((2.0 * PI).sqrt() * sigma) / p_accept;
                        -0.5 * z * z + coefficient.ln()
                    })
                    .collect();
                log_sum_exp(&terms)
            }
            Some(q) => {
                let upper = (x + 0.5 * q).min(self.high);
                let lower = (x - 0.5 * q).max(self.low);
                let probability: f64 = self
                    .components()
                    .map(|(w, mu, sigma)| {
                        w * (normal_cdf(upper, mu, sigma) - normal_cdf(lower, mu, sigma))
                    })
                    .sum();
                (probability + EPS).ln() - (p_accept + EPS).ln()
            }
        }
    }

    /// Number of mixture components, prior included.
    #[cfg(test)]
    pub(crate) fn n_components(&self) -> usize {
        self.mus.len()
    }

    #[cfg(test)]
    pub(crate) fn mus(&self) -> &[f64] {
        &self.mus
    }

    #[cfg(test)]
    pub(crate) fn sigmas(&self) -> &[f64] {
        &self.sigmas
    }

    #[cfg(test)]
    pub(crate) fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn components(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.weights
            .iter()
            .zip(&self.mus)
            .zip(&self.sigmas)
            .map(|((&w, &mu), &sigma)| (w, mu, sigma))
    }

    fn pick_component<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let threshold: f64 = rng.random::<f64>();
        let mut cumulative = 0.0;
        for (i, &w) in self.weights.iter().enumerate() {
            cumulative += w;
            if threshold < cumulative {
                return i;
            }
        }
        // Rounding left the cumulative sum just below 1.0.
        self.weights
            .iter()
            .rposition(|&w| w > 0.0)
            .unwrap_or(self.weights.len() - 1)
    }
}

/// Bandwidth of each sorted component: the larger gap to its neighbours, with
/// the domain bounds as outer neighbours.
fn neighbour_sigmas(mus: &[f64], low: f64, high: f64, consider_endpoints: bool) -> Vec<f64> {
    let mut padded = Vec::with_capacity(mus.len() + 2);
    padded.push(low);
    padded.extend_from_slice(mus);
    padded.push(high);

    let mut sigmas: Vec<f64> = padded
        .windows(3)
        .map(|w| (w[1] - w[0]).max(w[2] - w[1]))
        .collect();

    // A lone component keeps both gaps.
    if !consider_endpoints && mus.len() >= 2 {
        let k = padded.len();
        sigmas[0] = padded[2] - padded[1];
        let last = sigmas.len() - 1;
        sigmas[last] = padded[k - 2] - padded[k - 3];
    }
    sigmas
}

/// Standard normal CDF evaluated at `(x - mu) / sigma`.
fn normal_cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma.max(EPS);
    0.5 * erfc(-z / SQRT_2)
}

/// Inverse of the standard normal CDF.
fn normal_ppf(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Draws from `N(mu, sigma)` truncated to `[low, high]` by inverting the CDF.
///
/// When the interval lies in the upper tail the draw is mirrored so the CDF is
/// always evaluated where it has precision.
fn sample_truncated_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mu: f64,
    sigma: f64,
    low: f64,
    high: f64,
) -> f64 {
    let sigma = sigma.max(EPS);
    let alpha = (low - mu) / sigma;
    let beta = (high - mu) / sigma;
    let z = if alpha > 0.0 {
        -standard_truncated_normal(rng, -beta, -alpha)
    } else {
        standard_truncated_normal(rng, alpha, beta)
    };
    (mu + sigma * z).clamp(low, high)
}

fn standard_truncated_normal<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    let pa = 0.5 * erfc(-a / SQRT_2);
    let pb = 0.5 * erfc(-b / SQRT_2);
    let u = pa + rng.random::<f64>() * (pb - pa);
    normal_ppf(u).clamp(a, b)
}

/// Numerically stable log-sum-exp.
fn log_sum_exp(values: &[f64]) -> f64 {
    let max_val = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_val.is_infinite() {
        return max_val;
    }

    let sum: f64 = values.iter().map(|&v| (v - max_val).exp()).sum();
    max_val + sum.ln()
}
