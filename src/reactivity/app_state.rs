// ============================================================================
// spark-components - Application State
// Foreground/background transitions published through a slot
// ============================================================================

use std::fmt;

use tracing::debug;

use crate::primitives::slot::{slot_with_value, ReactiveSlot};

/// Where the application is in its visibility lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppState {
    /// The process started and nothing has been reported yet.
    FirstLaunch,
    EntersForeground,
    EntersBackground,
}

/// Publishes application state changes to one presenter.
///
/// The host platform reports transitions; the presenter observes
/// [`monitor`](Self::monitor). Repeated reports of the same state are not
/// redelivered, and a late observer receives the current state.
///
/// # Example
///
/// ```
/// use spark_components::{AppState, AppStateMonitor};
///
/// let monitor = AppStateMonitor::new();
/// assert_eq!(monitor.current(), AppState::FirstLaunch);
///
/// assert!(monitor.report(AppState::EntersBackground));
/// assert!(!monitor.report(AppState::EntersBackground));
/// assert_eq!(monitor.current(), AppState::EntersBackground);
/// ```
#[derive(Clone)]
pub struct AppStateMonitor {
    state: ReactiveSlot<AppState>,
}

impl AppStateMonitor {
    pub fn new() -> Self {
        Self {
            state: slot_with_value(AppState::FirstLaunch),
        }
    }

    /// Record a transition. Returns whether the state changed.
    pub fn report(&self, state: AppState) -> bool {
        let changed = self.state.set_value(state);
        if changed {
            debug!(?state, "application state changed");
        }
        changed
    }

    pub fn current(&self) -> AppState {
        self.state.peek().unwrap_or(AppState::FirstLaunch)
    }

    /// The slot carrying state changes. It accepts a single observer.
    pub fn monitor(&self) -> ReactiveSlot<AppState> {
        self.state.clone()
    }
}

impl Default for AppStateMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AppStateMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppStateMonitor")
            .field("current", &self.current())
            .finish()
    }
}
