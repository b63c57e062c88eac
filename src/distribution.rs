//! Parameter distribution types.
//!
//! A [`Distribution`] describes the domain a parameter is sampled from. The set
//! of variants is closed; every sampler in this crate matches on it directly.
//!
//! Values travel through the samplers in their *internal representation*, a
//! plain `f64`: floats as-is, integers widened, categorical choices as their
//! index. [`Distribution::to_internal`] and [`Distribution::from_internal`]
//! convert between [`ParamValue`] and that representation.

use core::fmt;

use crate::error::{Error, Result};
use crate::param::ParamValue;

/// Relative tolerance used when checking that a range is a multiple of a step.
const STEP_TOLERANCE: f64 = 1e-8;

/// The value of one categorical choice.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CategoricalChoice {
    /// An absent value.
    None,
    /// A boolean choice.
    Bool(bool),
    /// An integer choice.
    Int(i64),
    /// A floating-point choice.
    Float(f64),
    /// A string choice.
    Str(String),
}

impl fmt::Display for CategoricalChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoricalChoice::None => write!(f, "None"),
            CategoricalChoice::Bool(b) => write!(f, "{b}"),
            CategoricalChoice::Int(i) => write!(f, "{i}"),
            CategoricalChoice::Float(x) => write!(f, "{x}"),
            CategoricalChoice::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CategoricalChoice {
    fn from(value: bool) -> Self {
        CategoricalChoice::Bool(value)
    }
}

impl From<i64> for CategoricalChoice {
    fn from(value: i64) -> Self {
        CategoricalChoice::Int(value)
    }
}

impl From<f64> for CategoricalChoice {
    fn from(value: f64) -> Self {
        CategoricalChoice::Float(value)
    }
}

impl From<&str> for CategoricalChoice {
    fn from(value: &str) -> Self {
        CategoricalChoice::Str(value.to_owned())
    }
}

impl From<String> for CategoricalChoice {
    fn from(value: String) -> Self {
        CategoricalChoice::Str(value)
    }
}

/// Enum wrapping all parameter distribution types.
///
/// Bounds are inclusive. Use the checked constructors ([`Distribution::uniform`],
/// [`Distribution::int_uniform`], ...) to get validation; hand-built values are
/// validated again when an estimator is built from them.
///
/// # Examples
///
/// ```
/// use tpe_sampler::Distribution;
///
/// let lr = Distribution::log_uniform(1e-5, 1e-1).unwrap();
/// assert!(lr.is_log());
///
/// let layers = Distribution::int_uniform_with_step(0, 100, 10).unwrap();
/// assert_eq!(layers.bounds(), Some((0.0, 100.0)));
///
/// assert!(Distribution::uniform(2.0, 1.0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Distribution {
    /// Continuous values in `[low, high]`.
    Uniform {
        /// Lower bound (inclusive).
        low: f64,
        /// Upper bound (inclusive).
        high: f64,
    },
    /// Continuous values in `[low, high]`, sampled in log space.
    LogUniform {
        /// Lower bound (inclusive, positive).
        low: f64,
        /// Upper bound (inclusive).
        high: f64,
    },
    /// Values on the grid `low, low + q, ..., high`.
    DiscreteUniform {
        /// Lower bound (inclusive).
        low: f64,
        /// Upper bound (inclusive).
        high: f64,
        /// Grid spacing.
        q: f64,
    },
    /// Integers on the grid `low, low + step, ..., high`.
    IntUniform {
        /// Lower bound (inclusive).
        low: i64,
        /// Upper bound (inclusive).
        high: i64,
        /// Grid spacing (1 for plain integers).
        step: i64,
    },
    /// Integers in `[low, high]`, sampled in log space.
    IntLogUniform {
        /// Lower bound (inclusive, at least 1).
        low: i64,
        /// Upper bound (inclusive).
        high: i64,
    },
    /// One of a fixed list of choices.
    Categorical {
        /// The available choices, in order.
        choices: Vec<CategoricalChoice>,
    },
}

impl Distribution {
    /// Creates a checked [`Distribution::Uniform`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` if `low > high` or a bound is not finite.
    pub fn uniform(low: f64, high: f64) -> Result<Self> {
        let d = Distribution::Uniform { low, high };
        d.validate()?;
        Ok(d)
    }

    /// Creates a checked [`Distribution::LogUniform`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` if `low > high`, or
    /// `Error::InvalidLogBounds` if `low <= 0`.
    pub fn log_uniform(low: f64, high: f64) -> Result<Self> {
        let d = Distribution::LogUniform { low, high };
        d.validate()?;
        Ok(d)
    }

    /// Creates a checked [`Distribution::DiscreteUniform`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` if `low > high`, or `Error::InvalidStep`
    /// if `q` is not positive or `high - low` is not a multiple of `q`.
    pub fn discrete_uniform(low: f64, high: f64, q: f64) -> Result<Self> {
        let d = Distribution::DiscreteUniform { low, high, q };
        d.validate()?;
        Ok(d)
    }

    /// Creates a checked [`Distribution::IntUniform`] with step 1.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` if `low > high`.
    pub fn int_uniform(low: i64, high: i64) -> Result<Self> {
        Self::int_uniform_with_step(low, high, 1)
    }

    /// Creates a checked [`Distribution::IntUniform`] with a custom step.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` if `low > high`, or `Error::InvalidStep`
    /// if `step` is not positive or does not divide `high - low`.
    pub fn int_uniform_with_step(low: i64, high: i64, step: i64) -> Result<Self> {
        let d = Distribution::IntUniform { low, high, step };
        d.validate()?;
        Ok(d)
    }

    /// Creates a checked [`Distribution::IntLogUniform`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` if `low > high`, or
    /// `Error::InvalidLogBounds` if `low < 1`.
    pub fn int_log_uniform(low: i64, high: i64) -> Result<Self> {
        let d = Distribution::IntLogUniform { low, high };
        d.validate()?;
        Ok(d)
    }

    /// Creates a checked [`Distribution::Categorical`].
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyChoices` if no choices are given.
    pub fn categorical<I, C>(choices: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<CategoricalChoice>,
    {
        let d = Distribution::Categorical {
            choices: choices.into_iter().map(Into::into).collect(),
        };
        d.validate()?;
        Ok(d)
    }

    /// Checks the invariants of this distribution.
    ///
    /// # Errors
    ///
    /// Returns the matching bounds/step/choices error when an invariant is broken.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<()> {
        match self {
            Distribution::Uniform { low, high } => check_bounds(*low, *high),
            Distribution::LogUniform { low, high } => {
                check_bounds(*low, *high)?;
                if *low <= 0.0 {
                    return Err(Error::InvalidLogBounds(*low));
                }
                Ok(())
            }
            Distribution::DiscreteUniform { low, high, q } => {
                check_bounds(*low, *high)?;
                let invalid = Error::InvalidStep {
                    low: *low,
                    high: *high,
                    step: *q,
                };
                if !q.is_finite() || *q <= 0.0 {
                    return Err(invalid);
                }
                let ratio = (high - low) / q;
                if (ratio - ratio.round()).abs() > STEP_TOLERANCE * ratio.max(1.0) {
                    return Err(invalid);
                }
                Ok(())
            }
            Distribution::IntUniform { low, high, step } => {
                check_bounds(*low as f64, *high as f64)?;
                let Some(range) = high.checked_sub(*low) else {
                    return Err(Error::InvalidBounds {
                        low: *low as f64,
                        high: *high as f64,
                    });
                };
                if *step <= 0 || range % step != 0 {
                    return Err(Error::InvalidStep {
                        low: *low as f64,
                        high: *high as f64,
                        step: *step as f64,
                    });
                }
                Ok(())
            }
            Distribution::IntLogUniform { low, high } => {
                check_bounds(*low as f64, *high as f64)?;
                if *low < 1 {
                    return Err(Error::InvalidLogBounds(*low as f64));
                }
                Ok(())
            }
            Distribution::Categorical { choices } => {
                if choices.is_empty() {
                    return Err(Error::EmptyChoices);
                }
                Ok(())
            }
        }
    }

    /// Returns the inclusive bounds in internal representation.
    ///
    /// Categorical distributions report `(0, n_choices - 1)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            Distribution::Uniform { low, high }
            | Distribution::LogUniform { low, high }
            | Distribution::DiscreteUniform { low, high, .. } => Some((*low, *high)),
            Distribution::IntUniform { low, high, .. }
            | Distribution::IntLogUniform { low, high } => Some((*low as f64, *high as f64)),
            Distribution::Categorical { choices } => {
                Some((0.0, choices.len().saturating_sub(1) as f64))
            }
        }
    }

    /// Returns `true` when the distribution is sampled in log space.
    #[must_use]
    pub fn is_log(&self) -> bool {
        matches!(
            self,
            Distribution::LogUniform { .. } | Distribution::IntLogUniform { .. }
        )
    }

    /// Returns the grid spacing of stepped distributions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn step(&self) -> Option<f64> {
        match self {
            Distribution::DiscreteUniform { q, .. } => Some(*q),
            Distribution::IntUniform { step, .. } => Some(*step as f64),
            _ => None,
        }
    }

    /// Returns `true` when the domain contains exactly one value.
    #[must_use]
    pub fn is_single(&self) -> bool {
        match self {
            Distribution::Uniform { low, high }
            | Distribution::LogUniform { low, high }
            | Distribution::DiscreteUniform { low, high, .. } => low == high,
            Distribution::IntUniform { low, high, .. }
            | Distribution::IntLogUniform { low, high } => low == high,
            Distribution::Categorical { choices } => choices.len() == 1,
        }
    }

    /// Returns the only value of a single-point domain.
    #[must_use]
    pub fn single_value(&self) -> Option<ParamValue> {
        if !self.is_single() {
            return None;
        }
        Some(match self {
            Distribution::Uniform { low, .. }
            | Distribution::LogUniform { low, .. }
            | Distribution::DiscreteUniform { low, .. } => ParamValue::Float(*low),
            Distribution::IntUniform { low, .. } | Distribution::IntLogUniform { low, .. } => {
                ParamValue::Int(*low)
            }
            Distribution::Categorical { .. } => ParamValue::Categorical(0),
        })
    }

    /// Returns `true` if `value` has the right kind and lies inside the domain.
    #[must_use]
    pub fn contains(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (
                Distribution::Uniform { low, high }
                | Distribution::LogUniform { low, high }
                | Distribution::DiscreteUniform { low, high, .. },
                ParamValue::Float(v),
            ) => (*low..=*high).contains(v),
            (
                Distribution::IntUniform { low, high, .. }
                | Distribution::IntLogUniform { low, high },
                ParamValue::Int(v),
            ) => (*low..=*high).contains(v),
            (Distribution::Categorical { choices }, ParamValue::Categorical(i)) => {
                *i < choices.len()
            }
            _ => false,
        }
    }

    /// Number of choices of a categorical distribution.
    #[must_use]
    pub fn n_choices(&self) -> Option<usize> {
        match self {
            Distribution::Categorical { choices } => Some(choices.len()),
            _ => None,
        }
    }

    /// Returns the categorical choice at `index`.
    #[must_use]
    pub fn choice(&self, index: usize) -> Option<&CategoricalChoice> {
        match self {
            Distribution::Categorical { choices } => choices.get(index),
            _ => None,
        }
    }

    /// Converts a parameter value into its internal `f64` representation.
    ///
    /// Returns `None` when the value kind does not match the distribution.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_internal(&self, value: &ParamValue) -> Option<f64> {
        match (self, value) {
            (
                Distribution::Uniform { .. }
                | Distribution::LogUniform { .. }
                | Distribution::DiscreteUniform { .. },
                ParamValue::Float(v),
            ) => Some(*v),
            (
                Distribution::IntUniform { .. } | Distribution::IntLogUniform { .. },
                ParamValue::Int(v),
            ) => Some(*v as f64),
            (Distribution::Categorical { .. }, ParamValue::Categorical(i)) => Some(*i as f64),
            _ => None,
        }
    }

    /// Converts an internal representation back into a parameter value.
    ///
    /// The result is snapped to the step grid (if any) and clamped into the
    /// domain, so it always satisfies [`Distribution::contains`].
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn from_internal(&self, value: f64) -> ParamValue {
        match self {
            Distribution::Uniform { low, high } | Distribution::LogUniform { low, high } => {
                ParamValue::Float(value.clamp(*low, *high))
            }
            Distribution::DiscreteUniform { low, high, q } => {
                let k = ((value - low) / q).round();
                ParamValue::Float((low + k * q).clamp(*low, *high))
            }
            Distribution::IntUniform { low, high, step } => {
                let k = ((value - *low as f64) / *step as f64).round() as i64;
                let v = low.saturating_add(k.saturating_mul(*step));
                ParamValue::Int(v.clamp(*low, *high))
            }
            Distribution::IntLogUniform { low, high } => {
                ParamValue::Int((value.round() as i64).clamp(*low, *high))
            }
            Distribution::Categorical { choices } => {
                let last = choices.len().saturating_sub(1);
                ParamValue::Categorical((value.round().max(0.0) as usize).min(last))
            }
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Distribution::Uniform { .. } => "uniform",
            Distribution::LogUniform { .. } => "log-uniform",
            Distribution::DiscreteUniform { .. } => "discrete-uniform",
            Distribution::IntUniform { .. } => "int-uniform",
            Distribution::IntLogUniform { .. } => "int-log-uniform",
            Distribution::Categorical { .. } => "categorical",
        }
    }
}

fn check_bounds(low: f64, high: f64) -> Result<()> {
    if !low.is_finite() || !high.is_finite() || low > high {
        return Err(Error::InvalidBounds { low, high });
    }
    Ok(())
}
