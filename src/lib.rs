// ============================================================================
// spark-components - Presenter Lifecycle Primitives for Rust
// ============================================================================
//
// The contract every presenter-like component relies on: a view's inputs and
// outputs are live exactly while attached, and are released exactly once.
//
// - ReactiveSlot        single-consumer value cell
// - ResourceLedger      named registry of cancelable/destroyable handles
// - AttachableComponent attach/detach/destroy protocol over ledgers
// - Interactor          worker/notifier job execution
// - AppStateMonitor     foreground/background transitions
// ============================================================================

pub mod core;
pub mod entity;
pub mod primitives;
pub mod reactivity;

// Re-export core items at crate root for ergonomic access
pub use crate::core::error::{
    AlreadyObservedError, ComponentError, EmptyCallbackSetError, MissingRequiredFieldError,
    RejectedTaskError,
};
pub use crate::core::types::{no_action, Action, Cancelable, Cancellation, Destroyable, Teardown};

// Re-export primitives at crate root
pub use primitives::bindings::Bindings;
pub use primitives::component::{AttachableComponent, ComponentScope, Presenter};
pub use primitives::ledger::{LedgerEntry, ResourceLedger};
pub use primitives::slot::{
    signal_slot, slot, slot_with_value, ObservationHandle, Observer, ReactiveSlot, SlotMode,
};

// Re-export reactivity
pub use reactivity::app_state::{AppState, AppStateMonitor};
pub use reactivity::execution::{
    ExecutionContext, ImmediateContext, QueueContext, Task, ThreadContext,
};
pub use reactivity::interactor::{Interactor, JobHandle};
pub use reactivity::observer::{BoxError, ObserverBuilder, StreamObserver};

// Re-export entities
pub use entity::{Irrelevant, RecoverableError, RecoverableErrorBuilder};

// =============================================================================
// TESTS
// =============================================================================
