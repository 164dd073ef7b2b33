// ============================================================================
// spark-components - Reactivity Module
// Job callbacks, execution contexts, the interactor and app state
// ============================================================================

pub mod app_state;
pub mod execution;
pub mod interactor;
pub mod observer;

pub use app_state::{AppState, AppStateMonitor};
pub use execution::{ExecutionContext, ImmediateContext, QueueContext, Task, ThreadContext};
pub use interactor::{Interactor, JobHandle};
pub use observer::{BoxError, ObserverBuilder, StreamObserver};
