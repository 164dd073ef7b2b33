// ============================================================================
// spark-components - Core Module
// Capability traits, shared callback types and errors
// ============================================================================

pub mod error;
pub mod types;

// Re-export commonly used items
pub use error::{
    AlreadyObservedError, ComponentError, EmptyCallbackSetError, MissingRequiredFieldError,
    RejectedTaskError,
};
pub use types::{no_action, Action, Cancelable, Cancellation, Destroyable, Teardown};
