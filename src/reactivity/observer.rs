// ============================================================================
// spark-components - Stream Observer
// Start/next/error/done callback bundles for one-off jobs
// ============================================================================

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::core::error::EmptyCallbackSetError;
use crate::core::types::Action;

/// Failure carried to `on_error`.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

type NextFn<T> = Arc<dyn Fn(T) + Send + Sync>;
type ErrorFn = Arc<dyn Fn(BoxError) + Send + Sync>;

// =============================================================================
// STREAM OBSERVER
// =============================================================================

/// Receives the outcome of a job. Missing callbacks are no-ops.
pub struct StreamObserver<T> {
    start: Option<Action>,
    next: Option<NextFn<T>>,
    error: Option<ErrorFn>,
    done: Option<Action>,
}

impl<T> StreamObserver<T> {
    pub fn on_start(&self) {
        if let Some(f) = &self.start {
            f();
        }
    }

    pub fn on_next(&self, value: T) {
        if let Some(f) = &self.next {
            f(value);
        }
    }

    pub fn on_error(&self, error: BoxError) {
        if let Some(f) = &self.error {
            f(error);
        }
    }

    pub fn on_done(&self) {
        if let Some(f) = &self.done {
            f();
        }
    }
}

impl<T> Clone for StreamObserver<T> {
    fn clone(&self) -> Self {
        Self {
            start: self.start.clone(),
            next: self.next.clone(),
            error: self.error.clone(),
            done: self.done.clone(),
        }
    }
}

impl<T> fmt::Debug for StreamObserver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamObserver")
            .field("start", &self.start.is_some())
            .field("next", &self.next.is_some())
            .field("error", &self.error.is_some())
            .field("done", &self.done.is_some())
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builds a [`StreamObserver`].
///
/// A strict builder refuses to build an observer with no callbacks, catching
/// a forgotten `when_*` before any value flows.
///
/// # Example
///
/// ```
/// use spark_components::ObserverBuilder;
///
/// assert!(ObserverBuilder::<u32>::strict().build().is_err());
/// assert!(ObserverBuilder::<u32>::quiet().build().is_ok());
///
/// let observer = ObserverBuilder::<u32>::strict()
///     .when_next(|n| println!("got {n}"))
///     .build()
///     .unwrap();
/// observer.on_next(3);
/// ```
pub struct ObserverBuilder<T> {
    allow_quiet: bool,
    observer: StreamObserver<T>,
}

impl<T> ObserverBuilder<T> {
    /// A builder whose `build` fails when no callback is set.
    pub fn strict() -> Self {
        Self::new(false)
    }

    /// A builder that accepts an observer with no callbacks.
    pub fn quiet() -> Self {
        Self::new(true)
    }

    pub fn new(allow_quiet: bool) -> Self {
        Self {
            allow_quiet,
            observer: StreamObserver {
                start: None,
                next: None,
                error: None,
                done: None,
            },
        }
    }

    pub fn when_start<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.observer.start = Some(Arc::new(f));
        self
    }

    pub fn when_next<F: Fn(T) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.observer.next = Some(Arc::new(f));
        self
    }

    pub fn when_error<F: Fn(BoxError) + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.observer.error = Some(Arc::new(f));
        self
    }

    pub fn when_done<F: Fn() + Send + Sync + 'static>(mut self, f: F) -> Self {
        self.observer.done = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<StreamObserver<T>, EmptyCallbackSetError> {
        let o = &self.observer;
        let is_empty = o.start.is_none() && o.next.is_none() && o.error.is_none() && o.done.is_none();
        if is_empty && !self.allow_quiet {
            return Err(EmptyCallbackSetError);
        }
        Ok(self.observer)
    }
}

// =============================================================================
// TESTS
// =============================================================================
