//! Trial storage collaborator.
//!
//! The samplers never own trial history. Each sampling call asks a
//! [`Storage`] for a fresh snapshot through [`Storage::get_all_trials`] and
//! works on that snapshot only.
//!
//! # Available backends
//!
//! | Backend | Description |
//! |---------|-------------|
//! | [`MemoryStorage`] | In-memory `Vec` behind a read-write lock |
//!
//! # Implementing a custom backend
//!
//! Implement [`Storage`] for your own type (e.g. a database client). Only
//! [`direction`](Storage::direction) and
//! [`get_all_trials`](Storage::get_all_trials) are required;
//! [`best_trial`](Storage::best_trial) has a default built on top of them.
//! Failures should be reported as [`Error::Storage`](crate::Error::Storage);
//! samplers propagate them unchanged.

mod memory;

pub use memory::MemoryStorage;

use crate::error::Result;
use crate::trial::FrozenTrial;
use crate::types::{Direction, TrialState};

/// Read access to the trial history of one optimization experiment.
///
/// Implementations must be `Send + Sync` because several trial-execution
/// threads may sample concurrently against the same store.
pub trait Storage: Send + Sync {
    /// Whether the experiment minimizes or maximizes its objective.
    fn direction(&self) -> Direction;

    /// Returns every trial of the experiment, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce its history.
    fn get_all_trials(&self) -> Result<Vec<FrozenTrial>>;

    /// Returns the best completed trial so far, or `None` if nothing completed.
    ///
    /// Ties keep the earliest trial.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`get_all_trials`](Storage::get_all_trials).
    fn best_trial(&self) -> Result<Option<FrozenTrial>> {
        let sign = self.direction().sign();
        let best = self
            .get_all_trials()?
            .into_iter()
            .filter(|t| t.state == TrialState::Complete)
            .filter_map(|t| t.value.filter(|v| !v.is_nan()).map(|v| (sign * v, t)))
            .fold(None, |best: Option<(f64, FrozenTrial)>, (loss, trial)| match best {
                Some((best_loss, _)) if best_loss <= loss => best,
                _ => Some((loss, trial)),
            });
        Ok(best.map(|(_, t)| t))
    }
}
