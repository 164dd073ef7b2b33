//! Property tests for ResourceLedger: every registered handle is released
//! exactly once, and never while it is still the live entry for its name.

use proptest::prelude::*;
use spark_components::{Cancellation, LedgerEntry, ResourceLedger, Teardown};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Op {
    Register { name: u8, destroyable: bool },
    Cancel { name: u8 },
    DisposeAll,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..5, any::<bool>()).prop_map(|(name, destroyable)| Op::Register { name, destroyable }),
        2 => (0u8..5).prop_map(|name| Op::Cancel { name }),
        1 => Just(Op::DisposeAll),
    ]
}

fn entry(id: usize, destroyable: bool, releases: &Rc<RefCell<Vec<usize>>>) -> LedgerEntry {
    let releases = releases.clone();
    if destroyable {
        LedgerEntry::destroyable(Teardown::new(move || releases.borrow_mut().push(id)))
    } else {
        LedgerEntry::cancelable(Cancellation::new(move || releases.borrow_mut().push(id)))
    }
}

proptest! {
    #[test]
    fn handles_are_released_exactly_once(ops in proptest::collection::vec(op(), 0..80)) {
        let releases = Rc::new(RefCell::new(Vec::new()));
        // Model: name -> id of the live handle.
        let mut live: HashMap<u8, usize> = HashMap::new();
        let mut ledger = ResourceLedger::new();
        let mut registered = 0usize;

        for op in ops {
            match op {
                Op::Register { name, destroyable } => {
                    let id = registered;
                    registered += 1;
                    let before = releases.borrow().len();
                    ledger.register(name.to_string(), entry(id, destroyable, &releases));
                    if let Some(previous) = live.insert(name, id) {
                        prop_assert_eq!(releases.borrow().len(), before + 1);
                        prop_assert_eq!(releases.borrow().last().copied(), Some(previous));
                    } else {
                        prop_assert_eq!(releases.borrow().len(), before);
                    }
                }
                Op::Cancel { name } => {
                    let was_live = live.remove(&name).is_some();
                    prop_assert_eq!(ledger.cancel(&name.to_string()), was_live);
                }
                Op::DisposeAll => {
                    ledger.dispose_all();
                    live.clear();
                    prop_assert!(ledger.is_empty());
                }
            }

            prop_assert_eq!(ledger.len(), live.len());
            for id in live.values() {
                prop_assert!(!releases.borrow().contains(id));
            }
        }

        drop(ledger);

        let mut released = releases.borrow().clone();
        released.sort_unstable();
        prop_assert_eq!(released, (0..registered).collect::<Vec<_>>());
    }
}
