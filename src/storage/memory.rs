use core::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::Storage;
use crate::error::Result;
use crate::trial::FrozenTrial;
use crate::types::{Direction, TrialState};

/// In-memory trial storage.
///
/// A thin wrapper around a `Vec<FrozenTrial>` behind a read-write lock.
/// Snapshots returned by [`Storage::get_all_trials`] are clones, so callers
/// never hold the lock while sampling.
///
/// # Examples
///
/// ```
/// use tpe_sampler::storage::{MemoryStorage, Storage};
/// use tpe_sampler::{Direction, FrozenTrial, TrialState};
///
/// let storage = MemoryStorage::new(Direction::Minimize);
/// storage.push(FrozenTrial::new(0, TrialState::Complete).with_value(1.0));
/// assert_eq!(storage.get_all_trials().unwrap().len(), 1);
/// ```
pub struct MemoryStorage {
    direction: Direction,
    trials: RwLock<Vec<FrozenTrial>>,
    next_number: AtomicU64,
}

impl MemoryStorage {
    /// Creates a new, empty in-memory store.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            trials: RwLock::new(Vec::new()),
            next_number: AtomicU64::new(0),
        }
    }

    /// Creates an in-memory store pre-populated with `trials`.
    #[must_use]
    pub fn with_trials(direction: Direction, trials: Vec<FrozenTrial>) -> Self {
        let next = trials.iter().map(|t| t.number).max().map_or(0, |n| n + 1);
        Self {
            direction,
            trials: RwLock::new(trials),
            next_number: AtomicU64::new(next),
        }
    }

    /// Appends a trial record.
    pub fn push(&self, trial: FrozenTrial) {
        self.next_number.fetch_max(trial.number + 1, Ordering::SeqCst);
        self.trials.write().push(trial);
    }

    /// Atomically reserves the next trial number and records a running trial
    /// with it.
    #[must_use]
    pub fn create_trial(&self) -> FrozenTrial {
        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let trial = FrozenTrial::new(number, TrialState::Running);
        self.trials.write().push(trial.clone());
        trial
    }

    /// Replaces the stored record that has the same `number` as `trial`.
    ///
    /// Records that are not found are appended.
    pub fn update(&self, trial: FrozenTrial) {
        let mut trials = self.trials.write();
        match trials.iter_mut().find(|t| t.number == trial.number) {
            Some(slot) => *slot = trial,
            None => trials.push(trial),
        }
    }

    /// Number of stored trials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trials.read().len()
    }

    /// Returns `true` if no trial has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trials.read().is_empty()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(Direction::Minimize)
    }
}

impl Storage for MemoryStorage {
    fn direction(&self) -> Direction {
        self.direction
    }

    fn get_all_trials(&self) -> Result<Vec<FrozenTrial>> {
        Ok(self.trials.read().clone())
    }
}
