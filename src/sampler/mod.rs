//! Sampler trait and implementations for parameter sampling.

pub mod random;
pub mod tpe;

use std::collections::HashMap;

use crate::distribution::Distribution;
use crate::error::Result;
use crate::param::ParamValue;
use crate::storage::Storage;
use crate::trial::FrozenTrial;

pub use random::RandomSampler;
pub use tpe::{TpeSampler, TpeSamplerBuilder};

/// A joint search space: parameter name to distribution.
pub type SearchSpace = HashMap<String, Distribution>;

/// Trait for pluggable parameter sampling strategies.
///
/// A trial is sampled in two phases. First the driver asks for a *relative*
/// search space and samples it jointly through
/// [`sample_relative`](Sampler::sample_relative). Every parameter that phase
/// did not cover is then sampled on its own through
/// [`sample_independent`](Sampler::sample_independent).
///
/// The trait requires `Send + Sync` so one sampler can serve several
/// trial-execution threads.
pub trait Sampler: Send + Sync {
    /// Returns the search space to sample jointly for `trial`.
    ///
    /// The default is an empty space (no relative sampling).
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    fn infer_relative_search_space(
        &self,
        _storage: &dyn Storage,
        _trial: &FrozenTrial,
    ) -> Result<SearchSpace> {
        Ok(SearchSpace::new())
    }

    /// Samples every parameter of `search_space` jointly.
    ///
    /// An empty map tells the driver to fall back to independent sampling.
    ///
    /// # Errors
    ///
    /// Propagates storage and estimator errors.
    fn sample_relative(
        &self,
        _storage: &dyn Storage,
        _trial: &FrozenTrial,
        _search_space: &SearchSpace,
    ) -> Result<HashMap<String, ParamValue>> {
        Ok(HashMap::new())
    }

    /// Samples a single parameter value from `distribution`.
    ///
    /// # Arguments
    ///
    /// * `storage` - Source of the trial history.
    /// * `trial` - The trial being sampled for.
    /// * `name` - The parameter name.
    /// * `distribution` - The parameter distribution to sample from.
    ///
    /// # Errors
    ///
    /// Propagates storage and estimator errors.
    fn sample_independent(
        &self,
        storage: &dyn Storage,
        trial: &FrozenTrial,
        name: &str,
        distribution: &Distribution,
    ) -> Result<ParamValue>;

    /// Replaces the random state with a freshly seeded one.
    fn reseed_rng(&self) {}
}
