// ============================================================================
// spark-components - Resource Ledger
//
// Named registry of live cancelable/destroyable handles for one owner scope.
// Similar to an effect scope, but keyed: each name holds at most one live
// handle, and registering under a taken name tears the old one down first.
// ============================================================================
//
// Single-threaded by contract. Every mutating method takes `&mut self`, so
// exclusive access is checked by the borrow checker, and handles are not
// required to be `Send`, so a ledger holding thread-bound handles stays on
// its thread.
// ============================================================================

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::core::types::{Cancelable, Destroyable};

// =============================================================================
// LEDGER ENTRY
// =============================================================================

/// One handle stored in a ledger.
pub enum LedgerEntry {
    /// An in-flight operation. Only canceled if not already canceled.
    Cancelable(Box<dyn Cancelable>),
    /// A resource with a one-shot teardown. Always destroyed.
    Destroyable(Box<dyn Destroyable>),
}

impl LedgerEntry {
    pub fn cancelable<C: Cancelable + 'static>(handle: C) -> Self {
        LedgerEntry::Cancelable(Box::new(handle))
    }

    pub fn destroyable<D: Destroyable + 'static>(resource: D) -> Self {
        LedgerEntry::Destroyable(Box::new(resource))
    }

    pub fn is_cancelable(&self) -> bool {
        matches!(self, LedgerEntry::Cancelable(_))
    }

    pub fn is_destroyable(&self) -> bool {
        matches!(self, LedgerEntry::Destroyable(_))
    }

    /// Run the variant-specific teardown.
    fn release(self) {
        match self {
            LedgerEntry::Cancelable(mut handle) => {
                if !handle.is_canceled() {
                    handle.cancel();
                }
            }
            LedgerEntry::Destroyable(mut resource) => resource.destroy(),
        }
    }

    /// Destroyables are released before cancelables in `dispose_all`.
    fn release_rank(&self) -> u8 {
        match self {
            LedgerEntry::Destroyable(_) => 0,
            LedgerEntry::Cancelable(_) => 1,
        }
    }
}

impl fmt::Debug for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEntry::Cancelable(handle) => f
                .debug_struct("Cancelable")
                .field("canceled", &handle.is_canceled())
                .finish(),
            LedgerEntry::Destroyable(_) => f.write_str("Destroyable"),
        }
    }
}

// =============================================================================
// RESOURCE LEDGER
// =============================================================================

/// A named registry of resources released together.
///
/// Dropping the ledger releases whatever it still holds.
///
/// # Example
///
/// ```
/// use spark_components::{Cancellation, ResourceLedger};
///
/// let mut ledger = ResourceLedger::new();
/// ledger.register_cancelable("load", Cancellation::new(|| println!("first load canceled")));
///
/// // Same name: the first load is canceled before the second is stored.
/// ledger.register_cancelable("load", Cancellation::new(|| {}));
/// assert_eq!(ledger.len(), 1);
///
/// ledger.dispose_all();
/// assert!(ledger.is_empty());
/// ```
#[derive(Default)]
pub struct ResourceLedger {
    entries: HashMap<String, (u64, LedgerEntry)>,
    next_seq: u64,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry` under `name`, releasing any entry already there first.
    pub fn register(&mut self, name: impl Into<String>, entry: LedgerEntry) {
        let name = name.into();
        if self.cancel(&name) {
            debug!(name = %name, "ledger entry replaced");
        }
        self.next_seq += 1;
        self.entries.insert(name, (self.next_seq, entry));
    }

    pub fn register_cancelable<C: Cancelable + 'static>(&mut self, name: impl Into<String>, handle: C) {
        self.register(name, LedgerEntry::cancelable(handle));
    }

    pub fn register_destroyable<D: Destroyable + 'static>(&mut self, name: impl Into<String>, resource: D) {
        self.register(name, LedgerEntry::destroyable(resource));
    }

    /// Remove and release the entry under `name`.
    ///
    /// Returns whether an entry was present.
    pub fn cancel(&mut self, name: &str) -> bool {
        match self.entries.remove(name) {
            Some((_, entry)) => {
                entry.release();
                true
            }
            None => false,
        }
    }

    /// Release every entry and empty the ledger.
    ///
    /// Destroyables go first, then cancelables; each group in registration
    /// order.
    pub fn dispose_all(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        let mut drained: Vec<(u64, LedgerEntry)> = self.entries.drain().map(|(_, e)| e).collect();
        drained.sort_by_key(|(seq, entry)| (entry.release_rank(), *seq));

        let count = drained.len();
        for (_, entry) in drained {
            entry.release();
        }
        debug!(count, "ledger disposed");
    }

    pub fn get(&self, name: &str) -> Option<&LedgerEntry> {
        self.entries.get(name).map(|(_, entry)| entry)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<(u64, &str)> = self
            .entries
            .iter()
            .map(|(name, (seq, _))| (*seq, name.as_str()))
            .collect();
        names.sort_unstable_by_key(|(seq, _)| *seq);
        names.into_iter().map(|(_, name)| name).collect()
    }
}

impl Drop for ResourceLedger {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl fmt::Debug for ResourceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLedger")
            .field("names", &self.names())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
