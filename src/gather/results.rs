use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::fetch::FetchOutcome;

#[derive(Debug, Default)]
struct Entries {
    values: Vec<u64>,
    failures: usize,
}

/// Append-only price collection shared by every fetch task of a batch run.
///
/// All access goes through one mutex, so concurrent appends are serialised and
/// a read racing with in-flight tasks can only be stale.
#[derive(Debug, Default)]
pub struct ResultCollection {
    entries: Mutex<Entries>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, value: u64) {
        self.lock().values.push(value);
    }

    /// Record one fetch attempt: the price, or the zero sentinel for a failure.
    /// Returns the collection size after the append.
    pub fn append_outcome(&self, outcome: &FetchOutcome) -> usize {
        let mut entries = self.lock();
        entries.values.push(outcome.value());
        if outcome.is_failure() {
            entries.failures += 1;
        }
        entries.values.len()
    }

    pub fn len(&self) -> usize {
        self.lock().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries that are failure sentinels rather than real prices.
    pub fn failures(&self) -> usize {
        self.lock().failures
    }

    /// Sum of every entry, widened so no count of `u64` prices can overflow.
    pub fn total(&self) -> u128 {
        self.lock().values.iter().map(|value| u128::from(*value)).sum()
    }

    pub fn snapshot(&self) -> Vec<u64> {
        self.lock().values.clone()
    }
}
