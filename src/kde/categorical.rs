//! Smoothed histogram over categorical choice indices.

use rand::Rng;

/// Weighted choice frequencies blended with a uniform prior.
///
/// `P(c) = (w(c) + prior_weight / n) / (W + prior_weight)` where `w(c)` is the
/// total weight of observations of choice `c`, `W` the total weight of all
/// observations and `n` the number of choices.
#[derive(Clone, Debug)]
pub(crate) struct CategoricalEstimator {
    probabilities: Vec<f64>,
}

impl CategoricalEstimator {
    /// Builds the estimator. Observations outside `0..n_choices` are ignored.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(
        observations: &[usize],
        observation_weights: &[f64],
        n_choices: usize,
        prior_weight: f64,
    ) -> Self {
        debug_assert_eq!(observations.len(), observation_weights.len());

        let mut counts = vec![0.0; n_choices];
        for (&index, &weight) in observations.iter().zip(observation_weights) {
            if let Some(count) = counts.get_mut(index) {
                *count += weight;
            }
        }
        let total: f64 = counts.iter().sum();
        let prior = prior_weight / n_choices as f64;
        let denominator = total + prior_weight;

        let probabilities = if denominator > 0.0 {
            counts.iter().map(|c| (c + prior) / denominator).collect()
        } else {
            vec![1.0 / n_choices as f64; n_choices]
        };
        Self { probabilities }
    }

    /// Draws a choice index.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let threshold: f64 = rng.random::<f64>();
        let mut cumulative = 0.0;
        for (i, &p) in self.probabilities.iter().enumerate() {
            cumulative += p;
            if threshold < cumulative {
                return i;
            }
        }
        self.probabilities.len().saturating_sub(1)
    }

    /// Log probability of choice `index`.
    pub(crate) fn log_pdf(&self, index: usize) -> f64 {
        self.probabilities
            .get(index)
            .map_or(f64::NEG_INFINITY, |p| p.ln())
    }

    #[cfg(test)]
    pub(crate) fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}
