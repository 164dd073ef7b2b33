// ============================================================================
// spark-components - Bindings
// The resources one view attachment keeps alive
// ============================================================================

use std::collections::HashSet;

use crate::core::types::{Cancelable, Destroyable};
use crate::primitives::ledger::{LedgerEntry, ResourceLedger};

/// The resources produced by a presenter's per-attach hook.
///
/// Named entries follow ledger rules: a later entry with the same name
/// replaces (and releases) the earlier one once registered. Unnamed entries
/// never replace anything.
///
/// # Example
///
/// ```
/// use spark_components::{slot, Bindings, Teardown};
///
/// let title = slot::<String>();
/// let bindings = Bindings::new()
///     .cancelable("title", title.subscribe(|t| println!("{t}")).unwrap())
///     .destroyable("tooltip", Teardown::new(|| {}));
/// assert_eq!(bindings.len(), 2);
/// ```
#[derive(Default)]
#[must_use = "bindings do nothing until returned from the attach hook"]
pub struct Bindings {
    // `None` marks an entry added without a name.
    entries: Vec<(Option<String>, LedgerEntry)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for a presenter that binds nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn cancelable<C: Cancelable + 'static>(mut self, name: impl Into<String>, handle: C) -> Self {
        self.entries.push((Some(name.into()), LedgerEntry::cancelable(handle)));
        self
    }

    pub fn destroyable<D: Destroyable + 'static>(mut self, name: impl Into<String>, resource: D) -> Self {
        self.entries.push((Some(name.into()), LedgerEntry::destroyable(resource)));
        self
    }

    /// Add a cancelable under a generated name.
    pub fn add<C: Cancelable + 'static>(mut self, handle: C) -> Self {
        self.entries.push((None, LedgerEntry::cancelable(handle)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry into a fresh ledger, in the order they were added.
    ///
    /// Unnamed entries get `#binding-N` names that no named entry uses.
    pub fn into_ledger(self) -> ResourceLedger {
        let taken: HashSet<String> = self
            .entries
            .iter()
            .filter_map(|(name, _)| name.clone())
            .collect();
        let mut generated = 0usize;
        let mut ledger = ResourceLedger::new();
        for (name, entry) in self.entries {
            let name = name.unwrap_or_else(|| loop {
                let candidate = format!("#binding-{generated}");
                generated += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            });
            ledger.register(name, entry);
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Cancellation, Teardown};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn unnamed_entries_get_distinct_names() {
        let ledger = Bindings::new()
            .add(Cancellation::canceled())
            .add(Cancellation::canceled())
            .into_ledger();

        assert_eq!(ledger.names(), vec!["#binding-0", "#binding-1"]);
    }

    #[test]
    fn unnamed_entries_never_replace_a_named_one() {
        let released = Rc::new(Cell::new(false));
        let flag = released.clone();

        let ledger = Bindings::new()
            .add(Cancellation::canceled())
            .cancelable("#binding-0", Cancellation::new(move || flag.set(true)))
            .add(Cancellation::canceled())
            .into_ledger();

        assert!(!released.get());
        assert_eq!(ledger.names(), vec!["#binding-1", "#binding-0", "#binding-2"]);
    }

    #[test]
    fn duplicate_names_release_the_earlier_entry() {
        let released = Rc::new(Cell::new(false));
        let flag = released.clone();

        let ledger = Bindings::new()
            .destroyable("x", Teardown::new(move || flag.set(true)))
            .destroyable("x", Teardown::new(|| {}))
            .into_ledger();

        assert!(released.get());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn empty_bindings_make_an_empty_ledger() {
        let bindings = Bindings::empty();
        assert!(bindings.is_empty());
        assert!(bindings.into_ledger().is_empty());
    }
}
