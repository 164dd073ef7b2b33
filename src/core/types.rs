// ============================================================================
// spark-components - Core Types
// Capabilities shared by every lifecycle-managed resource
// ============================================================================
//
// Two teardown capabilities exist:
// - Cancelable: an in-flight operation that can be stopped and queried
// - Destroyable: a resource with a one-shot teardown
//
// A ResourceLedger stores either kind under a name. Both traits are object
// safe so the ledger can hold heterogeneous handles behind one enum.
// ============================================================================

use std::fmt;
use std::sync::Arc;

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================

/// An in-flight operation that can be canceled.
///
/// `cancel` must be safe to call more than once; callers that go through a
/// ledger only cancel handles that report `!is_canceled()`.
pub trait Cancelable {
    /// Stop the operation.
    fn cancel(&mut self);

    /// Whether `cancel` has already taken effect.
    fn is_canceled(&self) -> bool;
}

/// A resource with a one-shot teardown.
///
/// Idempotence is the resource's own responsibility: the ledger calls
/// `destroy` unconditionally.
pub trait Destroyable {
    fn destroy(&mut self);
}

// =============================================================================
// ACTIONS
// =============================================================================

/// A shareable zero-argument callback (recovery, cancellation, start, done).
pub type Action = Arc<dyn Fn() + Send + Sync>;

/// An action that does nothing.
pub fn no_action() -> Action {
    Arc::new(|| {})
}

// =============================================================================
// CLOSURE ADAPTERS
// =============================================================================

/// A `Cancelable` backed by a closure that runs at most once.
///
/// # Example
///
/// ```
/// use spark_components::{Cancelable, Cancellation};
///
/// let mut c = Cancellation::new(|| println!("stopped"));
/// assert!(!c.is_canceled());
/// c.cancel();
/// c.cancel(); // no-op
/// assert!(c.is_canceled());
/// ```
pub struct Cancellation {
    on_cancel: Option<Box<dyn FnOnce()>>,
}

impl Cancellation {
    pub fn new<F: FnOnce() + 'static>(on_cancel: F) -> Self {
        Self {
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// A handle that is already canceled.
    pub fn canceled() -> Self {
        Self { on_cancel: None }
    }
}

impl Cancelable for Cancellation {
    fn cancel(&mut self) {
        if let Some(f) = self.on_cancel.take() {
            f();
        }
    }

    fn is_canceled(&self) -> bool {
        self.on_cancel.is_none()
    }
}

impl fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellation")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// A `Destroyable` backed by a closure that runs at most once.
pub struct Teardown {
    on_destroy: Option<Box<dyn FnOnce()>>,
}

impl Teardown {
    pub fn new<F: FnOnce() + 'static>(on_destroy: F) -> Self {
        Self {
            on_destroy: Some(Box::new(on_destroy)),
        }
    }

    /// Whether the teardown has already run.
    pub fn is_destroyed(&self) -> bool {
        self.on_destroy.is_none()
    }
}

impl Destroyable for Teardown {
    fn destroy(&mut self) {
        if let Some(f) = self.on_destroy.take() {
            f();
        }
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
