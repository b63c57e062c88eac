//! The TPE sampler and its builder.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::kde::ParzenEstimatorParameters;
use crate::param::ParamValue;
use crate::sampler::{RandomSampler, Sampler, SearchSpace};
use crate::storage::Storage;
use crate::trial::FrozenTrial;

use super::candidate::{CandidateSettings, Weighted, sample_param};
use super::gamma::{GammaFn, checked_gamma, default_gamma, hyperopt_default_gamma, probe_gamma};
use super::observation::{extract, extract_multivariate, select_values, split_indices};
use super::weights::{WeightsFn, default_weights, probe_weights, uniform_weights};

/// A Tree-structured Parzen Estimator sampler.
///
/// Once the history holds at least `n_startup_trials` trials, each call ranks
/// the usable trials, keeps the best `gamma(n)` as "good" and fits one Parzen
/// estimator to the good values and one to the rest. Candidates are drawn from
/// the good estimator and the one maximizing `l(x) / g(x)` is returned. Before
/// that, sampling is delegated to a fallback sampler (a [`RandomSampler`]
/// unless configured otherwise).
///
/// # Examples
///
/// ```
/// use tpe_sampler::sampler::tpe::TpeSampler;
///
/// // Create with default settings
/// let sampler = TpeSampler::new();
///
/// // Create with custom settings using the builder
/// let sampler = TpeSampler::builder()
///     .n_startup_trials(20)
///     .n_ei_candidates(32)
///     .seed(42)
///     .build()
///     .unwrap();
/// ```
pub struct TpeSampler {
    parzen: ParzenEstimatorParameters,
    /// Number of trials before TPE kicks in.
    n_startup_trials: usize,
    /// Number of candidates scored per draw.
    n_ei_candidates: usize,
    gamma: GammaFn,
    weights: WeightsFn,
    multivariate: bool,
    seed: Option<u64>,
    /// Thread-safe RNG for sampling.
    rng: Mutex<StdRng>,
    /// Used while the history is shorter than `n_startup_trials`.
    fallback: Arc<dyn Sampler>,
}

impl TpeSampler {
    /// Creates a new TPE sampler with default settings.
    ///
    /// Default settings:
    /// - `consider_prior`: true, `prior_weight`: 1.0
    /// - `consider_magic_clip`: true, `consider_endpoints`: false
    /// - `n_startup_trials`: 10
    /// - `n_ei_candidates`: 24
    /// - gamma: [`default_gamma`], weights: [`uniform_weights`]
    /// - seed: None (use OS-provided entropy)
    #[must_use]
    pub fn new() -> Self {
        Self {
            parzen: ParzenEstimatorParameters::default(),
            n_startup_trials: DEFAULT_N_STARTUP_TRIALS,
            n_ei_candidates: DEFAULT_N_EI_CANDIDATES,
            gamma: Arc::new(default_gamma),
            weights: Arc::new(uniform_weights),
            multivariate: false,
            seed: None,
            rng: Mutex::new(StdRng::from_os_rng()),
            fallback: Arc::new(RandomSampler::new()),
        }
    }

    /// Creates a builder for configuring a TPE sampler.
    #[must_use]
    pub fn builder() -> TpeSamplerBuilder {
        TpeSamplerBuilder::new()
    }

    /// A builder preset with hyperopt's defaults: 20 start-up trials,
    /// [`hyperopt_default_gamma`] and [`default_weights`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tpe_sampler::sampler::tpe::TpeSampler;
    ///
    /// let sampler = TpeSampler::hyperopt_parameters().seed(1).build().unwrap();
    /// assert_eq!(sampler.n_startup_trials(), 20);
    /// ```
    #[must_use]
    pub fn hyperopt_parameters() -> TpeSamplerBuilder {
        TpeSamplerBuilder::new()
            .n_startup_trials(HYPEROPT_N_STARTUP_TRIALS)
            .gamma(hyperopt_default_gamma)
            .weights(default_weights)
    }

    /// Whether a prior component is added to numeric estimators.
    #[must_use]
    pub fn consider_prior(&self) -> bool {
        self.parzen.consider_prior
    }

    /// Weight of the prior component and categorical smoothing.
    #[must_use]
    pub fn prior_weight(&self) -> f64 {
        self.parzen.prior_weight
    }

    /// Whether the minimum bandwidth grows with the number of components.
    #[must_use]
    pub fn consider_magic_clip(&self) -> bool {
        self.parzen.consider_magic_clip
    }

    /// Whether domain bounds act as neighbours of the outermost components.
    #[must_use]
    pub fn consider_endpoints(&self) -> bool {
        self.parzen.consider_endpoints
    }

    /// Trials required before TPE replaces the fallback sampler.
    #[must_use]
    pub fn n_startup_trials(&self) -> usize {
        self.n_startup_trials
    }

    /// Candidates scored per draw.
    #[must_use]
    pub fn n_ei_candidates(&self) -> usize {
        self.n_ei_candidates
    }

    /// Whether relative sampling is enabled.
    #[must_use]
    pub fn multivariate(&self) -> bool {
        self.multivariate
    }

    /// The seed the sampler was built with, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn settings(&self) -> CandidateSettings {
        CandidateSettings {
            parzen: self.parzen,
            n_ei_candidates: self.n_ei_candidates,
        }
    }

    /// Good/bad groups of one parameter, weighted.
    fn weighted_groups(
        &self,
        values: &[Option<f64>],
        good: &[usize],
        bad: &[usize],
    ) -> Result<(Weighted, Weighted)> {
        let good = Weighted::new(select_values(values, good), &self.weights)?;
        let bad = Weighted::new(select_values(values, bad), &self.weights)?;
        Ok((good, bad))
    }
}

impl Default for TpeSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TpeSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TpeSampler")
            .field("parzen", &self.parzen)
            .field("n_startup_trials", &self.n_startup_trials)
            .field("n_ei_candidates", &self.n_ei_candidates)
            .field("multivariate", &self.multivariate)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Sampler for TpeSampler {
    fn infer_relative_search_space(
        &self,
        storage: &dyn Storage,
        _trial: &FrozenTrial,
    ) -> Result<SearchSpace> {
        if !self.multivariate {
            return Ok(SearchSpace::new());
        }
        let trials = storage.get_all_trials()?;
        if trials.len() < MIN_TRIALS_FOR_RELATIVE {
            return Ok(SearchSpace::new());
        }
        Ok(storage
            .best_trial()?
            .map(|best| best.distributions)
            .unwrap_or_default())
    }

    fn sample_relative(
        &self,
        storage: &dyn Storage,
        _trial: &FrozenTrial,
        search_space: &SearchSpace,
    ) -> Result<HashMap<String, ParamValue>> {
        if search_space.is_empty() {
            return Ok(HashMap::new());
        }
        let trials = storage.get_all_trials()?;
        if trials.len() < self.n_startup_trials {
            return Ok(HashMap::new());
        }

        // Sorted so the RNG is consumed in the same order on every run.
        let mut names: Vec<&str> = search_space.keys().map(String::as_str).collect();
        names.sort_unstable();

        let observations = extract_multivariate(&trials, storage.direction(), &names)?;
        let n_good = checked_gamma(&self.gamma, observations.pairs.len())?;
        let (good, bad) = split_indices(&observations.pairs, n_good);
        trace_debug!(
            n_observations = observations.pairs.len(),
            n_good,
            n_params = names.len(),
            "tpe relative sampling"
        );

        let settings = self.settings();
        let mut rng = self.rng.lock();
        let mut params = HashMap::with_capacity(names.len());
        for name in names {
            let Some(distribution) = search_space.get(name) else {
                continue;
            };
            let values = observations.values.get(name).map_or(&[][..], Vec::as_slice);
            let (good_values, bad_values) = self.weighted_groups(values, &good, &bad)?;
            let value = sample_param(
                &mut *rng,
                name,
                distribution,
                &good_values,
                &bad_values,
                &settings,
            )?;
            params.insert(name.to_owned(), value);
        }
        Ok(params)
    }

    fn sample_independent(
        &self,
        storage: &dyn Storage,
        trial: &FrozenTrial,
        name: &str,
        distribution: &Distribution,
    ) -> Result<ParamValue> {
        if let Some(value) = distribution.single_value() {
            trace_debug!(param = name, "single-point domain, skipping estimation");
            return Ok(value);
        }

        let trials = storage.get_all_trials()?;
        if trials.len() < self.n_startup_trials {
            trace_debug!(
                param = name,
                n_trials = trials.len(),
                n_startup_trials = self.n_startup_trials,
                "tpe start-up phase, delegating to fallback sampler"
            );
            return self
                .fallback
                .sample_independent(storage, trial, name, distribution);
        }

        let observations = extract(&trials, storage.direction(), name)?;
        let n_good = checked_gamma(&self.gamma, observations.pairs.len())?;
        let (good, bad) = split_indices(&observations.pairs, n_good);
        let (good_values, bad_values) = self.weighted_groups(&observations.values, &good, &bad)?;
        trace_debug!(
            param = name,
            n_good = good_values.values.len(),
            n_bad = bad_values.values.len(),
            "tpe independent sampling"
        );

        let mut rng = self.rng.lock();
        sample_param(
            &mut *rng,
            name,
            distribution,
            &good_values,
            &bad_values,
            &self.settings(),
        )
    }

    fn reseed_rng(&self) {
        {
            let mut rng = self.rng.lock();
            let seed: u64 = rng.random();
            *rng = StdRng::seed_from_u64(seed);
        }
        self.fallback.reseed_rng();
        trace_info!("tpe sampler reseeded");
    }
}

const DEFAULT_N_STARTUP_TRIALS: usize = 10;
const DEFAULT_N_EI_CANDIDATES: usize = 24;
const HYPEROPT_N_STARTUP_TRIALS: usize = 20;
/// Relative sampling needs at least this many trials to infer a joint space.
const MIN_TRIALS_FOR_RELATIVE: usize = 2;

/// Builder for configuring a [`TpeSampler`].
///
/// Validation is deferred to [`build`](Self::build), which checks every
/// argument contract and returns `Error::Configuration` on a violation.
///
/// # Examples
///
/// ```
/// use tpe_sampler::sampler::tpe::{TpeSamplerBuilder, fixed_fraction_gamma};
///
/// let sampler = TpeSamplerBuilder::new()
///     .gamma(fixed_fraction_gamma(0.2).unwrap())
///     .consider_endpoints(true)
///     .n_startup_trials(5)
///     .seed(42)
///     .build()
///     .unwrap();
/// assert!(sampler.consider_endpoints());
/// ```
#[derive(Clone)]
pub struct TpeSamplerBuilder {
    parzen: ParzenEstimatorParameters,
    n_startup_trials: usize,
    n_ei_candidates: usize,
    gamma: GammaFn,
    weights: WeightsFn,
    multivariate: bool,
    seed: Option<u64>,
    fallback: Option<Arc<dyn Sampler>>,
}

impl TpeSamplerBuilder {
    /// Creates a new builder with default settings (see [`TpeSampler::new`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            parzen: ParzenEstimatorParameters::default(),
            n_startup_trials: DEFAULT_N_STARTUP_TRIALS,
            n_ei_candidates: DEFAULT_N_EI_CANDIDATES,
            gamma: Arc::new(default_gamma),
            weights: Arc::new(uniform_weights),
            multivariate: false,
            seed: None,
            fallback: None,
        }
    }

    /// Adds a prior component centred on the domain to numeric estimators.
    #[must_use]
    pub fn consider_prior(mut self, consider_prior: bool) -> Self {
        self.parzen.consider_prior = consider_prior;
        self
    }

    /// Sets the weight of the prior. Must be finite and positive.
    #[must_use]
    pub fn prior_weight(mut self, prior_weight: f64) -> Self {
        self.parzen.prior_weight = prior_weight;
        self
    }

    /// Raises the minimum bandwidth as `(high - low) / min(100, 1 + k)`.
    #[must_use]
    pub fn consider_magic_clip(mut self, consider_magic_clip: bool) -> Self {
        self.parzen.consider_magic_clip = consider_magic_clip;
        self
    }

    /// Lets the domain bounds act as neighbours of the outermost components.
    #[must_use]
    pub fn consider_endpoints(mut self, consider_endpoints: bool) -> Self {
        self.parzen.consider_endpoints = consider_endpoints;
        self
    }

    /// Sets the number of trials before TPE sampling begins.
    ///
    /// Until the history holds this many trials (in any state), sampling is
    /// delegated to the fallback sampler.
    #[must_use]
    pub fn n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Sets the number of candidates scored per draw. Must be at least 1.
    #[must_use]
    pub fn n_ei_candidates(mut self, n: usize) -> Self {
        self.n_ei_candidates = n;
        self
    }

    /// Sets the gamma function. `gamma(n)` must lie in `0..=n`.
    #[must_use]
    pub fn gamma<G>(mut self, gamma: G) -> Self
    where
        G: Fn(usize) -> usize + Send + Sync + 'static,
    {
        self.gamma = Arc::new(gamma);
        self
    }

    /// Sets the weights function. `weights(n)` must return `n` finite,
    /// non-negative weights.
    #[must_use]
    pub fn weights<W>(mut self, weights: W) -> Self
    where
        W: Fn(usize) -> Vec<f64> + Send + Sync + 'static,
    {
        self.weights = Arc::new(weights);
        self
    }

    /// Enables relative sampling of the joint search space.
    ///
    /// Parameters are still modelled independently; the joint space only
    /// shares the good/bad split between them.
    #[must_use]
    pub fn multivariate(mut self, multivariate: bool) -> Self {
        self.multivariate = multivariate;
        self
    }

    /// Sets a seed for reproducible sampling.
    ///
    /// The seed also seeds the default fallback sampler.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the sampler used during the start-up phase.
    #[must_use]
    pub fn fallback<S: Sampler + 'static>(mut self, sampler: S) -> Self {
        self.fallback = Some(Arc::new(sampler));
        self
    }

    /// Builds the configured [`TpeSampler`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `prior_weight` is not finite and
    /// positive, `n_ei_candidates` is zero, or the gamma or weights function
    /// breaks its contract for some `n` in `0..=100`.
    pub fn build(self) -> Result<TpeSampler> {
        let prior_weight = self.parzen.prior_weight;
        if !prior_weight.is_finite() || prior_weight <= 0.0 {
            return Err(Error::Configuration(format!(
                "prior_weight must be finite and positive, got {prior_weight}"
            )));
        }
        if self.n_ei_candidates == 0 {
            return Err(Error::Configuration(
                "n_ei_candidates must be at least 1".to_owned(),
            ));
        }
        probe_gamma(&self.gamma)?;
        probe_weights(&self.weights)?;

        if self.multivariate {
            trace_warn!(
                "multivariate TPE is experimental; \
                 parameters are modelled independently over a shared split"
            );
        }

        let rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let fallback = self.fallback.unwrap_or_else(|| match self.seed {
            Some(s) => Arc::new(RandomSampler::with_seed(s)),
            None => Arc::new(RandomSampler::new()),
        });

        Ok(TpeSampler {
            parzen: self.parzen,
            n_startup_trials: self.n_startup_trials,
            n_ei_candidates: self.n_ei_candidates,
            gamma: self.gamma,
            weights: self.weights,
            multivariate: self.multivariate,
            seed: self.seed,
            rng: Mutex::new(rng),
            fallback,
        })
    }
}

impl Default for TpeSamplerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TpeSamplerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TpeSamplerBuilder")
            .field("parzen", &self.parzen)
            .field("n_startup_trials", &self.n_startup_trials)
            .field("n_ei_candidates", &self.n_ei_candidates)
            .field("multivariate", &self.multivariate)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}
