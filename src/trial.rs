//! Read-only trial records consumed by the samplers.

use std::collections::{BTreeMap, HashMap};

use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::types::TrialState;

/// A snapshot of one trial as recorded by the storage collaborator.
///
/// Samplers only ever read these records. The builder-style `with_*` methods
/// exist for storages and tests that assemble histories by hand.
///
/// # Examples
///
/// ```
/// use tpe_sampler::{Distribution, FrozenTrial, ParamValue, TrialState};
///
/// let trial = FrozenTrial::new(0, TrialState::Complete)
///     .with_value(0.5)
///     .with_param("x", ParamValue::Float(0.25), Distribution::uniform(0.0, 1.0).unwrap());
///
/// assert_eq!(trial.param("x"), Some(&ParamValue::Float(0.25)));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrozenTrial {
    /// Sequential number of the trial within its study.
    pub number: u64,
    /// Storage-wide identifier.
    pub trial_id: u64,
    /// Lifecycle state.
    pub state: TrialState,
    /// Final objective value, if the trial produced one.
    pub value: Option<f64>,
    /// Sampled parameter values, keyed by parameter name.
    pub params: HashMap<String, ParamValue>,
    /// Distributions the parameters were sampled from, keyed by parameter name.
    pub distributions: HashMap<String, Distribution>,
    /// Intermediate objective values reported during the trial, keyed by step.
    pub intermediate_values: BTreeMap<u64, f64>,
}

impl FrozenTrial {
    /// Creates an empty record with `trial_id == number`.
    #[must_use]
    pub fn new(number: u64, state: TrialState) -> Self {
        Self {
            number,
            trial_id: number,
            state,
            value: None,
            params: HashMap::new(),
            distributions: HashMap::new(),
            intermediate_values: BTreeMap::new(),
        }
    }

    /// Sets the storage-wide identifier.
    #[must_use]
    pub fn with_trial_id(mut self, trial_id: u64) -> Self {
        self.trial_id = trial_id;
        self
    }

    /// Sets the final objective value.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Records a parameter value together with its distribution.
    #[must_use]
    pub fn with_param(
        mut self,
        name: impl Into<String>,
        value: ParamValue,
        distribution: Distribution,
    ) -> Self {
        let name = name.into();
        self.params.insert(name.clone(), value);
        self.distributions.insert(name, distribution);
        self
    }

    /// Records an intermediate value reported at `step`.
    #[must_use]
    pub fn with_intermediate_value(mut self, step: u64, value: f64) -> Self {
        self.intermediate_values.insert(step, value);
        self
    }

    /// Returns the value of parameter `name`, if the trial used it.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Returns the latest reported `(step, value)` pair.
    #[must_use]
    pub fn last_step(&self) -> Option<(u64, f64)> {
        self.intermediate_values
            .iter()
            .next_back()
            .map(|(&step, &value)| (step, value))
    }
}
