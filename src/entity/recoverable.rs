// ============================================================================
// spark-components - Recoverable Error
//
// A failure descriptor handed from business logic to the presentation layer,
// which offers the user a choice to recover or cancel. It is a value, never
// raised.
// ============================================================================

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::core::error::MissingRequiredFieldError;
use crate::core::types::Action;

/// An error with optional recovery and cancellation actions.
///
/// # Example
///
/// ```
/// use std::io;
/// use spark_components::RecoverableError;
///
/// let err = RecoverableError::builder()
///     .reason("Could not reach the server")
///     .cause(io::Error::new(io::ErrorKind::TimedOut, "timeout"))
///     .recovery(|| println!("retrying"))
///     .build()
///     .unwrap();
///
/// assert!(err.recover());
/// assert!(!err.cancel()); // no cancellation action
/// ```
#[derive(Clone)]
pub struct RecoverableError {
    reason: String,
    cause: Arc<dyn Error + Send + Sync>,
    recovery: Option<Action>,
    cancellation: Option<Action>,
}

impl RecoverableError {
    pub fn builder() -> RecoverableErrorBuilder {
        RecoverableErrorBuilder::default()
    }

    /// Human-readable reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The underlying failure.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    pub fn has_recovery(&self) -> bool {
        self.recovery.is_some()
    }

    pub fn has_cancellation(&self) -> bool {
        self.cancellation.is_some()
    }

    /// Run the recovery action. Returns whether one was set.
    pub fn recover(&self) -> bool {
        match &self.recovery {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }

    /// Run the cancellation action. Returns whether one was set.
    pub fn cancel(&self) -> bool {
        match &self.cancellation {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for RecoverableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoverableError")
            .field("reason", &self.reason)
            .field("cause", &self.cause)
            .field("recovery", &self.recovery.is_some())
            .field("cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl fmt::Display for RecoverableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.cause)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builds a [`RecoverableError`]. Reason and cause are required.
#[derive(Default)]
pub struct RecoverableErrorBuilder {
    reason: Option<String>,
    cause: Option<Arc<dyn Error + Send + Sync>>,
    recovery: Option<Action>,
    cancellation: Option<Action>,
}

impl RecoverableErrorBuilder {
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn cause<E: Error + Send + Sync + 'static>(mut self, cause: E) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Invoked when the user chooses to retry the failed operation.
    pub fn recovery<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.recovery = Some(Arc::new(f));
        self
    }

    /// Invoked when the user chooses to abandon the failed operation.
    pub fn cancellation<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.cancellation = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<RecoverableError, MissingRequiredFieldError> {
        let reason = self.reason.ok_or(MissingRequiredFieldError { field: "reason" })?;
        let cause = self.cause.ok_or(MissingRequiredFieldError { field: "cause" })?;
        Ok(RecoverableError {
            reason,
            cause,
            recovery: self.recovery,
            cancellation: self.cancellation,
        })
    }
}
