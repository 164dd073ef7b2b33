// ============================================================================
// spark-components - Primitives Module
// Lifecycle primitives: slot, ledger, bindings, component
// ============================================================================

pub mod bindings;
pub mod component;
pub mod ledger;
pub mod slot;

// Re-export for convenience
pub use bindings::Bindings;
pub use component::{AttachableComponent, ComponentScope, Presenter};
pub use ledger::{LedgerEntry, ResourceLedger};
pub use slot::{
    signal_slot, slot, slot_with_value, ObservationHandle, Observer, ReactiveSlot, SlotMode,
};
