// ============================================================================
// spark-components - Reactive Slot
//
// A ReactiveSlot holds at most one pending value and hands it to at most one
// observer. It is the wire between a business-logic layer (producer) and a
// single UI layer (consumer).
//
// Three factory modes model three UI patterns:
// - slot()             durable property, retains the last value
// - slot_with_value(v) same, pre-seeded
// - signal_slot()      "event happened", cleared once delivered
// ============================================================================
//
// Every mutation and every delivery runs inside one per-instance critical
// section. The lock is re-entrant so an observer may touch its own slot from
// the delivering thread; a value set during delivery is stored and delivered
// by that nested call.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;
use tracing::{debug, trace, warn};

use crate::core::error::AlreadyObservedError;
use crate::core::types::Cancelable;

// =============================================================================
// OBSERVER
// =============================================================================

/// The single consumer of a slot.
///
/// Cloning an `Observer` keeps its identity, which `observe` uses to tell a
/// re-subscription of the same observer apart from a competing one.
pub struct Observer<T> {
    func: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T> Observer<T> {
    pub fn new<F: Fn(&T) + Send + Sync + 'static>(f: F) -> Self {
        Self { func: Arc::new(f) }
    }

    /// Whether both observers wrap the same callback.
    pub fn same_as(&self, other: &Observer<T>) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }

    fn call(&self, value: &T) {
        (self.func)(value)
    }
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
        }
    }
}

impl<T> fmt::Debug for Observer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("ptr", &Arc::as_ptr(&self.func).cast::<()>())
            .finish()
    }
}

// =============================================================================
// SLOT MODE
// =============================================================================

/// What a slot does with its value after delivering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotMode {
    /// Keep the value; a late observer receives it again.
    #[default]
    Retain,
    /// Drop the value once an observer has received it.
    Signal,
}

// =============================================================================
// SLOT STATE
// =============================================================================

struct Registration<T> {
    id: u64,
    observer: Observer<T>,
}

struct SlotState<T> {
    value: Option<T>,
    observer: Option<Registration<T>>,
    /// Bumped on every stored value so a delivery can tell whether a newer
    /// value arrived while its observer ran.
    version: u64,
    next_registration: u64,
    deliveries: u64,
}

struct SlotInner<T> {
    mode: SlotMode,
    state: ReentrantMutex<RefCell<SlotState<T>>>,
}

impl<T: Clone + PartialEq> SlotInner<T> {
    fn new(value: Option<T>, mode: SlotMode) -> Self {
        Self {
            mode,
            state: ReentrantMutex::new(RefCell::new(SlotState {
                value,
                observer: None,
                version: 0,
                next_registration: 0,
                deliveries: 0,
            })),
        }
    }

    /// Hand the current value to the observer, if both are present.
    ///
    /// Must be called with the slot lock held. No `RefCell` borrow is held
    /// while the observer runs.
    fn deliver(&self, cell: &RefCell<SlotState<T>>) {
        let (value, observer, version) = {
            let state = cell.borrow();
            match (&state.value, &state.observer) {
                (Some(value), Some(reg)) => (value.clone(), reg.observer.clone(), state.version),
                _ => return,
            }
        };

        observer.call(&value);

        let mut state = cell.borrow_mut();
        state.deliveries += 1;
        trace!(deliveries = state.deliveries, "slot value delivered");
        if self.mode == SlotMode::Signal && state.version == version {
            state.value = None;
        }
    }
}

// =============================================================================
// REACTIVE SLOT
// =============================================================================

/// A thread-safe, single-consumer value cell.
///
/// Clones share the same cell.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use spark_components::{slot, Observer};
///
/// let title = slot::<String>();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// let _handle = title
///     .observe(Observer::new(move |v: &String| sink.lock().unwrap().push(v.clone())))
///     .unwrap();
///
/// title.set_value("home".to_string());
/// title.set_value("home".to_string()); // equal, not delivered
/// title.set_value("settings".to_string());
///
/// assert_eq!(*seen.lock().unwrap(), vec!["home", "settings"]);
/// ```
pub struct ReactiveSlot<T> {
    inner: Arc<SlotInner<T>>,
}

impl<T: Clone + PartialEq + Send + 'static> ReactiveSlot<T> {
    /// An empty slot that retains the last value.
    pub fn empty() -> Self {
        Self::with_mode(None, SlotMode::Retain)
    }

    /// A slot pre-seeded with `value` that retains the last value.
    pub fn with_value(value: T) -> Self {
        Self::with_mode(Some(value), SlotMode::Retain)
    }

    /// An empty slot whose value is cleared after each delivery.
    pub fn signal() -> Self {
        Self::with_mode(None, SlotMode::Signal)
    }

    pub fn with_mode(initial: Option<T>, mode: SlotMode) -> Self {
        Self {
            inner: Arc::new(SlotInner::new(initial, mode)),
        }
    }

    pub fn mode(&self) -> SlotMode {
        self.inner.mode
    }

    /// Store `value` and deliver it if it differs from the current value.
    ///
    /// Returns whether the value was distinct.
    pub fn set_value(&self, value: T) -> bool {
        let guard = self.inner.state.lock();
        let distinct = {
            let mut state = guard.borrow_mut();
            if state.value.as_ref() == Some(&value) {
                false
            } else {
                state.value = Some(value);
                state.version += 1;
                true
            }
        };

        if distinct {
            self.inner.deliver(&guard);
        } else {
            trace!("slot value unchanged, delivery skipped");
        }
        distinct
    }

    /// Register the single observer and deliver the current value to it.
    ///
    /// Fails if an observer is already registered, whether or not it is the
    /// same one. The returned handle unregisters the observer when canceled;
    /// dropping the handle does not.
    pub fn observe(&self, observer: Observer<T>) -> Result<ObservationHandle<T>, AlreadyObservedError> {
        let guard = self.inner.state.lock();
        let registration = {
            let mut state = guard.borrow_mut();
            if let Some(current) = &state.observer {
                let err = if current.observer.same_as(&observer) {
                    AlreadyObservedError::SameObserver
                } else {
                    AlreadyObservedError::AnotherObserver
                };
                warn!(error = %err, "observer rejected");
                return Err(err);
            }
            state.next_registration += 1;
            let id = state.next_registration;
            state.observer = Some(Registration { id, observer });
            id
        };
        debug!(registration, "observer registered");

        self.inner.deliver(&guard);

        Ok(ObservationHandle {
            slot: Arc::downgrade(&self.inner),
            registration,
            canceled: false,
        })
    }

    /// Shorthand for `observe(Observer::new(f))`.
    pub fn subscribe<F>(&self, f: F) -> Result<ObservationHandle<T>, AlreadyObservedError>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.observe(Observer::new(f))
    }

    /// A copy of the current value, without delivering it.
    pub fn peek(&self) -> Option<T> {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        state.value.clone()
    }

    /// Drop the current value without delivering anything.
    pub fn clear(&self) {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if state.value.take().is_some() {
            state.version += 1;
        }
    }

    pub fn has_observer(&self) -> bool {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        state.observer.is_some()
    }

    /// How many times a value has been handed to an observer.
    pub fn delivery_count(&self) -> u64 {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        state.deliveries
    }
}

impl<T> Clone for ReactiveSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> Default for ReactiveSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.state.lock();
        let mut out = f.debug_struct("ReactiveSlot");
        out.field("mode", &self.inner.mode);
        match guard.try_borrow() {
            Ok(state) => out
                .field("value", &state.value)
                .field("observed", &state.observer.is_some())
                .finish(),
            Err(_) => out.finish_non_exhaustive(),
        }
    }
}

// =============================================================================
// OBSERVATION HANDLE
// =============================================================================

/// Cancels one observer registration.
///
/// Holds the slot weakly: once every `ReactiveSlot` clone is gone, canceling
/// only flips the local flag. Canceling a stale handle never removes an
/// observer registered later.
#[must_use = "the observer stays registered until the handle is canceled"]
pub struct ObservationHandle<T> {
    slot: Weak<SlotInner<T>>,
    registration: u64,
    canceled: bool,
}

impl<T> ObservationHandle<T> {
    /// Unregister the observer. Idempotent.
    pub fn unobserve(&mut self) {
        if self.canceled {
            return;
        }
        self.canceled = true;

        let Some(inner) = self.slot.upgrade() else {
            return;
        };
        let guard = inner.state.lock();
        let mut state = guard.borrow_mut();
        if state
            .observer
            .as_ref()
            .is_some_and(|reg| reg.id == self.registration)
        {
            state.observer = None;
            debug!(registration = self.registration, "observer unregistered");
        }
    }
}

impl<T> Cancelable for ObservationHandle<T> {
    fn cancel(&mut self) {
        self.unobserve();
    }

    fn is_canceled(&self) -> bool {
        self.canceled
    }
}

impl<T> fmt::Debug for ObservationHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationHandle")
            .field("registration", &self.registration)
            .field("canceled", &self.canceled)
            .finish()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create an empty slot that retains its last value.
pub fn slot<T: Clone + PartialEq + Send + 'static>() -> ReactiveSlot<T> {
    ReactiveSlot::empty()
}

/// Create a slot pre-seeded with `value`.
pub fn slot_with_value<T: Clone + PartialEq + Send + 'static>(value: T) -> ReactiveSlot<T> {
    ReactiveSlot::with_value(value)
}

/// Create a self-clearing slot for one-shot notifications.
pub fn signal_slot<T: Clone + PartialEq + Send + 'static>() -> ReactiveSlot<T> {
    ReactiveSlot::signal()
}

// =============================================================================
// TESTS
// =============================================================================
