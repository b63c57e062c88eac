//! Random sampler implementation.

use parking_lot::Mutex;

use crate::distribution::Distribution;
use crate::error::Result;
use crate::param::ParamValue;
use crate::sampler::Sampler;
use crate::storage::Storage;
use crate::trial::FrozenTrial;

/// A simple random sampler that samples uniformly from distributions.
///
/// This sampler ignores the trial history and samples uniformly at random,
/// respecting log scale and step size constraints. It serves as a baseline
/// sampler and is used during the startup phase of [`TpeSampler`](super::TpeSampler).
///
/// # Examples
///
/// ```
/// use tpe_sampler::sampler::RandomSampler;
///
/// // Create with default RNG
/// let sampler = RandomSampler::new();
///
/// // Create with a fixed seed for reproducibility
/// let sampler = RandomSampler::with_seed(42);
/// ```
pub struct RandomSampler {
    rng: Mutex<fastrand::Rng>,
}

impl RandomSampler {
    /// Creates a new random sampler with a default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a new random sampler with a fixed seed for reproducibility.
    ///
    /// Using the same seed will produce the same sequence of sampled values.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    /// Draws one value from `distribution` without looking at any history.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn sample(&self, distribution: &Distribution) -> ParamValue {
        if let Some(value) = distribution.single_value() {
            return value;
        }

        let mut rng = self.rng.lock();
        match distribution {
            Distribution::Uniform { low, high } => {
                ParamValue::Float(f64_range(&mut rng, *low, *high))
            }
            Distribution::LogUniform { low, high } => {
                let v = f64_range(&mut rng, low.ln(), high.ln()).exp();
                ParamValue::Float(v.clamp(*low, *high))
            }
            Distribution::DiscreteUniform { low, high, q } => {
                let n_steps = ((high - low) / q).round() as i64;
                let k = rng.i64(0..=n_steps);
                ParamValue::Float((low + (k as f64) * q).clamp(*low, *high))
            }
            Distribution::IntUniform { low, high, step } => {
                let step = (*step).max(1);
                let n_steps = (i128::from(*high) - i128::from(*low)) / i128::from(step);
                let n_steps = i64::try_from(n_steps.max(0)).unwrap_or(i64::MAX);
                let k = rng.i64(0..=n_steps);
                ParamValue::Int(low.saturating_add(k.saturating_mul(step)).min(*high))
            }
            Distribution::IntLogUniform { low, high } => {
                // Widen by half an integer so the end points get a full bucket.
                let log_low = (*low as f64 - 0.5).ln();
                let log_high = (*high as f64 + 0.5).ln();
                let raw = f64_range(&mut rng, log_low, log_high).exp().round() as i64;
                ParamValue::Int(raw.clamp(*low, *high))
            }
            Distribution::Categorical { choices } => {
                ParamValue::Categorical(rng.usize(0..choices.len()))
            }
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn sample_independent(
        &self,
        _storage: &dyn Storage,
        _trial: &FrozenTrial,
        _name: &str,
        distribution: &Distribution,
    ) -> Result<ParamValue> {
        Ok(self.sample(distribution))
    }

    fn reseed_rng(&self) {
        let mut rng = self.rng.lock();
        let seed = rng.u64(..);
        *rng = fastrand::Rng::with_seed(seed);
    }
}

/// Generate a random `f64` in the range `[low, high)`.
#[inline]
fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}
