// ============================================================================
// spark-components - Attachable Component
//
// The presenter lifecycle: one-time init, per-view binding, bulk teardown.
// ============================================================================
//
// A component owns:
// - one ledger for its own lifetime (auto_destroy)
// - one ledger per attached view (whatever on_attach returned)
//
// States:
//   Uninitialized --attach--> Initialized --destroy--> Destroyed
// and, per view:
//   Detached --attach--> Attached --detach/attach/destroy--> released
//
// A component commonly outlives its views (a screen recreated after a
// configuration change attaches again), so on_init runs on the first attach
// only. Single-threaded by contract: every operation takes `&mut self`.
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::core::error::ComponentError;
use crate::core::types::Destroyable;
use crate::primitives::bindings::Bindings;
use crate::primitives::ledger::{LedgerEntry, ResourceLedger};

// =============================================================================
// PRESENTER HOOKS
// =============================================================================

/// Behavior plugged into an [`AttachableComponent`].
///
/// The implementing type is the component's state.
pub trait Presenter {
    /// The attachable UI surface. Views are told apart by `Eq`/`Hash`.
    type View: Eq + Hash + Clone;

    /// Runs once, on the first attach of any view. Initial loading goes here.
    fn on_init(&mut self, scope: &mut ComponentScope<'_>);

    /// Runs on every attach. Returns the resources that connect the view's
    /// outputs to the presenter and the presenter to the view's inputs.
    fn on_attach(&mut self, view: &Self::View, scope: &mut ComponentScope<'_>) -> Bindings;
}

/// Access to the component-lifetime ledger from inside a hook.
pub struct ComponentScope<'a> {
    own: &'a mut ResourceLedger,
}

impl ComponentScope<'_> {
    /// Keep `entry` alive until the component is destroyed.
    pub fn auto_destroy(&mut self, name: impl Into<String>, entry: LedgerEntry) {
        self.own.register(name, entry);
    }

    /// Release a component-lifetime entry early.
    pub fn cancel(&mut self, name: &str) -> bool {
        self.own.cancel(name)
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Initialized,
    Destroyed,
}

// =============================================================================
// ATTACHABLE COMPONENT
// =============================================================================

/// A presenter with its view and lifetime ledgers.
///
/// Dropping the component destroys it.
///
/// # Example
///
/// ```
/// use spark_components::{
///     slot, AttachableComponent, Bindings, ComponentScope, Presenter, ReactiveSlot,
/// };
///
/// struct Greeter {
///     greeting: ReactiveSlot<String>,
/// }
///
/// impl Presenter for Greeter {
///     type View = u32;
///
///     fn on_init(&mut self, _scope: &mut ComponentScope<'_>) {
///         self.greeting.set_value("hello".into());
///     }
///
///     fn on_attach(&mut self, _view: &u32, _scope: &mut ComponentScope<'_>) -> Bindings {
///         Bindings::new().cancelable("greeting", self.greeting.subscribe(|g| println!("{g}")).unwrap())
///     }
/// }
///
/// let mut component = AttachableComponent::new(Greeter { greeting: slot() });
/// component.attach(1).unwrap();
/// assert!(component.is_attached(&1));
/// component.destroy();
/// assert!(component.attach(1).is_err());
/// ```
pub struct AttachableComponent<P: Presenter> {
    presenter: P,
    // Declared before `own` so a plain drop releases view bindings first.
    views: HashMap<P::View, ResourceLedger>,
    own: ResourceLedger,
    lifecycle: Lifecycle,
}

impl<P: Presenter> AttachableComponent<P> {
    /// Wrap caller-supplied presenter state. Nothing runs until `attach`.
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            views: HashMap::new(),
            own: ResourceLedger::new(),
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Attach `view`, initializing the component on first use.
    ///
    /// Any bindings still held for an equal view are released before
    /// `on_attach` runs, so the new bindings may observe the same slots.
    pub fn attach(&mut self, view: P::View) -> Result<(), ComponentError> {
        match self.lifecycle {
            Lifecycle::Destroyed => {
                warn!("attach on a destroyed component rejected");
                return Err(ComponentError::UseAfterDestroy);
            }
            Lifecycle::Uninitialized => {
                self.presenter.on_init(&mut ComponentScope { own: &mut self.own });
                self.lifecycle = Lifecycle::Initialized;
                debug!("component initialized");
            }
            Lifecycle::Initialized => {}
        }

        if let Some(mut previous) = self.views.remove(&view) {
            debug!("view re-attached, previous bindings released");
            previous.dispose_all();
        }

        let bindings = self
            .presenter
            .on_attach(&view, &mut ComponentScope { own: &mut self.own });
        debug!(bindings = bindings.len(), "view attached");
        self.views.insert(view, bindings.into_ledger());
        Ok(())
    }

    /// Release the bindings of `view`.
    ///
    /// Returns whether the view was attached.
    pub fn detach(&mut self, view: &P::View) -> bool {
        match self.views.remove(view) {
            Some(mut ledger) => {
                ledger.dispose_all();
                debug!("view detached");
                true
            }
            None => false,
        }
    }

    /// Release every view's bindings, then the component's own resources.
    ///
    /// The component cannot be attached again afterward. Calling `destroy`
    /// twice is a no-op.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }

        let views = self.views.len();
        for ledger in self.views.values_mut() {
            ledger.dispose_all();
        }
        self.views.clear();
        self.own.dispose_all();

        self.lifecycle = Lifecycle::Destroyed;
        debug!(views, "component destroyed");
    }

    /// Keep `entry` alive until the component is destroyed, independent of
    /// any view.
    pub fn auto_destroy(&mut self, name: impl Into<String>, entry: LedgerEntry) -> Result<(), ComponentError> {
        if self.lifecycle == Lifecycle::Destroyed {
            warn!("auto_destroy on a destroyed component rejected");
            return Err(ComponentError::UseAfterDestroy);
        }
        self.own.register(name, entry);
        Ok(())
    }

    /// Whether `on_init` has run. Stays true after `destroy`.
    pub fn is_initialized(&self) -> bool {
        self.lifecycle != Lifecycle::Uninitialized
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    pub fn is_attached(&self, view: &P::View) -> bool {
        self.views.contains_key(view)
    }

    pub fn attached_count(&self) -> usize {
        self.views.len()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}

impl<P: Presenter> Destroyable for AttachableComponent<P> {
    fn destroy(&mut self) {
        AttachableComponent::destroy(self);
    }
}

impl<P: Presenter> Drop for AttachableComponent<P> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<P: Presenter> fmt::Debug for AttachableComponent<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachableComponent")
            .field("lifecycle", &self.lifecycle)
            .field("views", &self.views.len())
            .field("own", &self.own)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
