// ============================================================================
// spark-components - Errors
// Registration-time and construction-time failures
// ============================================================================
//
// Every error here signals a programmer mistake detected before any value
// flows. None of them are retried or swallowed by the crate.
// ============================================================================

use std::io;

use thiserror::Error;

/// Returned by `ReactiveSlot::observe` when an observer is already registered.
///
/// Both variants are rejected identically; the distinction only improves the
/// diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AlreadyObservedError {
    /// The observer being registered is the one already registered.
    #[error("attempt to re-subscribe the same observer")]
    SameObserver,
    /// A different observer is already registered.
    #[error("attempt to subscribe an observer while the slot already has one")]
    AnotherObserver,
}

/// Returned by a strict `ObserverBuilder::build` when no callback was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("observer does not define any callback and quiet mode is off")]
pub struct EmptyCallbackSetError;

/// Returned by `RecoverableErrorBuilder::build` when a required field is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("recoverable error requires both a reason and a cause (missing `{field}`)")]
pub struct MissingRequiredFieldError {
    pub field: &'static str,
}

/// Lifecycle violations of an `AttachableComponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// The component was destroyed and cannot be attached or extended again.
    #[error("component used after destroy")]
    UseAfterDestroy,
}

/// Returned by an `ExecutionContext` that could not accept a task.
///
/// The rejected task is dropped without running.
#[derive(Debug, Error)]
#[error("execution context `{context}` rejected the task")]
pub struct RejectedTaskError {
    pub context: String,
    #[source]
    pub source: io::Error,
}
