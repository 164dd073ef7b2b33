// ============================================================================
// spark-components - Interactor
//
// Runs business-logic jobs on a worker context and reports their outcome on
// a notification context.
// ============================================================================
//
// Flow of one job:
//   caller:   on_start
//   worker:   work()
//   notifier: on_next + on_done, or on_error
//
// The returned JobHandle is Cancelable, so it can be stored in a presenter's
// ledger. Canceling suppresses every callback not yet delivered; a job
// already running on the worker is not interrupted.
//
// Each callback runs inside the job's delivery gate. `cancel` takes the same
// gate, so once it returns no callback is running or will start. The gate is
// re-entrant: a callback may cancel its own job.
//
// A context that rejects a task turns into `on_error` on the thread that
// offered it, so every started job still ends in a terminal callback.
// ============================================================================

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};
use tracing::{trace, warn};

use crate::core::types::Cancelable;
use crate::reactivity::execution::ExecutionContext;
use crate::reactivity::observer::{BoxError, StreamObserver};

// =============================================================================
// DELIVERY GATE
// =============================================================================

#[derive(Default)]
struct DeliveryGate {
    canceled: ReentrantMutex<Cell<bool>>,
}

impl DeliveryGate {
    /// Run `callback` unless the job is canceled. Returns whether it ran.
    fn deliver(&self, callback: impl FnOnce()) -> bool {
        let canceled = self.canceled.lock();
        if canceled.get() {
            return false;
        }
        callback();
        true
    }

    fn cancel(&self) {
        self.canceled.lock().set(true);
    }

    fn is_canceled(&self) -> bool {
        self.canceled.lock().get()
    }
}

/// The observer of one job, taken by whichever path reports its outcome.
type PendingObserver<T> = Arc<Mutex<Option<StreamObserver<T>>>>;

fn report<T>(gate: &DeliveryGate, pending: &PendingObserver<T>, outcome: Result<T, BoxError>) {
    let Some(observer) = pending.lock().take() else {
        return;
    };
    let delivered = match outcome {
        Ok(value) => {
            gate.deliver(|| observer.on_next(value)) && gate.deliver(|| observer.on_done())
        }
        Err(err) => gate.deliver(|| observer.on_error(err)),
    };
    if !delivered {
        trace!("job canceled, outcome dropped");
    }
}

// =============================================================================
// JOB HANDLE
// =============================================================================

/// Cancels delivery of one job's outcome.
///
/// `cancel` waits for a callback running on another thread to return.
#[must_use = "dropping the handle loses the ability to cancel the job"]
pub struct JobHandle {
    gate: Arc<DeliveryGate>,
}

impl Cancelable for JobHandle {
    fn cancel(&mut self) {
        self.gate.cancel();
    }

    fn is_canceled(&self) -> bool {
        self.gate.is_canceled()
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

// =============================================================================
// INTERACTOR
// =============================================================================

/// Moves work off the caller's thread and results back onto the notifier.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use spark_components::{ImmediateContext, Interactor, ObserverBuilder, QueueContext};
///
/// let main_loop = Arc::new(QueueContext::new());
/// let interactor = Interactor::new(Arc::new(ImmediateContext), main_loop.clone());
///
/// let observer = ObserverBuilder::<u32>::strict()
///     .when_next(|n| assert_eq!(n, 42))
///     .build()
///     .unwrap();
/// let _job = interactor.execute(|| Ok(42), observer);
///
/// // The outcome waits for the main loop.
/// assert_eq!(main_loop.run_pending(), 1);
/// ```
#[derive(Clone)]
pub struct Interactor {
    worker: Arc<dyn ExecutionContext>,
    notifier: Arc<dyn ExecutionContext>,
}

impl Interactor {
    pub fn new(worker: Arc<dyn ExecutionContext>, notifier: Arc<dyn ExecutionContext>) -> Self {
        Self { worker, notifier }
    }

    /// Run `work` on the worker and report to `observer` on the notifier.
    pub fn execute<T, F>(&self, work: F, observer: StreamObserver<T>) -> JobHandle
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
    {
        let gate = Arc::new(DeliveryGate::default());
        observer.on_start();
        let pending: PendingObserver<T> = Arc::new(Mutex::new(Some(observer)));

        let notifier = self.notifier.clone();
        let (job_gate, job_pending) = (gate.clone(), pending.clone());
        let scheduled = self.worker.execute(Box::new(move || {
            if job_gate.is_canceled() {
                trace!("job canceled before it ran");
                return;
            }
            let outcome = work();

            let (post_gate, post_pending) = (job_gate.clone(), job_pending.clone());
            let posted = notifier.execute(Box::new(move || {
                report(&post_gate, &post_pending, outcome);
            }));
            if let Err(err) = posted {
                warn!(error = %err, "notifier rejected job outcome");
                report(&job_gate, &job_pending, Err(err.into()));
            }
        }));
        if let Err(err) = scheduled {
            warn!(error = %err, "worker rejected job");
            report(&gate, &pending, Err(err.into()));
        }

        JobHandle { gate }
    }
}

impl fmt::Debug for Interactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interactor").finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RejectedTaskError;
    use crate::reactivity::execution::{ImmediateContext, QueueContext, Task, ThreadContext};
    use crate::reactivity::observer::ObserverBuilder;
    use std::io;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    type Log = Arc<Mutex<Vec<String>>>;

    fn logging_observer(log: &Log) -> StreamObserver<u32> {
        let (l1, l2, l3, l4) = (log.clone(), log.clone(), log.clone(), log.clone());
        ObserverBuilder::strict()
            .when_start(move || l1.lock().push("start".into()))
            .when_next(move |v| l2.lock().push(format!("next {v}")))
            .when_error(move |e| l3.lock().push(format!("error {e}")))
            .when_done(move || l4.lock().push("done".into()))
            .build()
            .unwrap()
    }

    /// Refuses every task, like a thread context that cannot spawn.
    struct RejectingContext;

    impl ExecutionContext for RejectingContext {
        fn execute(&self, _task: Task) -> Result<(), RejectedTaskError> {
            Err(RejectedTaskError {
                context: "rejecting".to_string(),
                source: io::Error::new(io::ErrorKind::WouldBlock, "no capacity"),
            })
        }
    }

    // =========================================================================
    // Outcomes
    // =========================================================================

    #[test]
    fn successful_job_reports_next_then_done() {
        let log = Log::default();
        let interactor = Interactor::new(Arc::new(ImmediateContext), Arc::new(ImmediateContext));

        let job = interactor.execute(|| Ok(7), logging_observer(&log));

        assert_eq!(*log.lock(), vec!["start", "next 7", "done"]);
        assert!(!job.is_canceled());
    }

    #[test]
    fn failing_job_reports_error() {
        let log = Log::default();
        let interactor = Interactor::new(Arc::new(ImmediateContext), Arc::new(ImmediateContext));

        let _job = interactor.execute(|| Err("offline".into()), logging_observer(&log));

        assert_eq!(*log.lock(), vec!["start", "error offline"]);
    }

    #[test]
    fn work_runs_on_the_worker_and_reports_on_the_notifier() {
        let (tx, rx) = mpsc::channel();
        let interactor = Interactor::new(
            Arc::new(ThreadContext::named("job-worker")),
            Arc::new(ImmediateContext),
        );

        let observer = ObserverBuilder::strict()
            .when_next(move |worker_thread: Option<String>| {
                let notified_on = thread::current().name().map(str::to_string);
                tx.send((worker_thread, notified_on)).unwrap();
            })
            .build()
            .unwrap();
        let _job = interactor.execute(|| Ok(thread::current().name().map(str::to_string)), observer);

        let (worked_on, notified_on) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(worked_on.as_deref(), Some("job-worker"));
        assert_eq!(notified_on.as_deref(), Some("job-worker"));
    }

    #[test]
    fn outcome_from_a_worker_thread_waits_for_the_main_loop() {
        let (finished_tx, finished_rx) = mpsc::channel();
        let log = Log::default();
        let main_loop = Arc::new(QueueContext::new());
        let interactor = Interactor::new(Arc::new(ThreadContext::named("job-worker")), main_loop.clone());

        let _job = interactor.execute(
            move || {
                finished_tx.send(()).unwrap();
                Ok(3)
            },
            logging_observer(&log),
        );

        finished_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        // The worker posts right after `work` returns; pump until it lands.
        let mut ran = 0;
        while ran == 0 {
            ran = main_loop.run_pending();
            thread::yield_now();
        }
        assert_eq!(*log.lock(), vec!["start", "next 3", "done"]);
    }

    // =========================================================================
    // Rejection
    // =========================================================================

    #[test]
    fn rejected_by_the_worker_reports_error_on_the_caller() {
        let log = Log::default();
        let interactor = Interactor::new(Arc::new(RejectingContext), Arc::new(ImmediateContext));

        let _job = interactor.execute(|| Ok(1), logging_observer(&log));

        assert_eq!(
            *log.lock(),
            vec!["start", "error execution context `rejecting` rejected the task"]
        );
    }

    #[test]
    fn rejected_by_the_notifier_reports_error_on_the_worker() {
        let log = Log::default();
        let interactor = Interactor::new(Arc::new(ImmediateContext), Arc::new(RejectingContext));

        let _job = interactor.execute(|| Ok(1), logging_observer(&log));

        assert_eq!(
            *log.lock(),
            vec!["start", "error execution context `rejecting` rejected the task"]
        );
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    #[test]
    fn canceled_job_delivers_nothing_after_start() {
        let log = Log::default();
        let main_loop = Arc::new(QueueContext::new());
        let interactor = Interactor::new(Arc::new(ImmediateContext), main_loop.clone());

        let mut job = interactor.execute(|| Ok(1), logging_observer(&log));
        job.cancel();
        main_loop.run_pending();

        assert_eq!(*log.lock(), vec!["start"]);
        assert!(job.is_canceled());
    }

    #[test]
    fn canceling_inside_on_next_suppresses_on_done() {
        let log = Log::default();
        let main_loop = Arc::new(QueueContext::new());
        let interactor = Interactor::new(Arc::new(ImmediateContext), main_loop.clone());
        let handle: Arc<Mutex<Option<JobHandle>>> = Arc::default();

        let (next_log, done_log, own_handle) = (log.clone(), log.clone(), handle.clone());
        let observer = ObserverBuilder::strict()
            .when_next(move |v: u32| {
                next_log.lock().push(format!("next {v}"));
                if let Some(job) = own_handle.lock().as_mut() {
                    job.cancel();
                }
            })
            .when_done(move || done_log.lock().push("done".into()))
            .build()
            .unwrap();

        let job = interactor.execute(|| Ok(1), observer);
        *handle.lock() = Some(job);
        main_loop.run_pending();

        assert_eq!(*log.lock(), vec!["next 1"]);
        assert!(handle.lock().as_ref().is_some_and(|job| job.is_canceled()));
    }

    #[test]
    fn cancel_from_another_thread_waits_for_the_running_callback() {
        let log = Log::default();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel::<()>();
        let interactor = Interactor::new(
            Arc::new(ThreadContext::named("job-worker")),
            Arc::new(ImmediateContext),
        );

        let (next_log, done_log) = (log.clone(), log.clone());
        let resume_rx = Mutex::new(resume_rx);
        let observer = ObserverBuilder::strict()
            .when_next(move |v: u32| {
                entered_tx.send(()).unwrap();
                resume_rx.lock().recv().unwrap();
                next_log.lock().push(format!("next {v}"));
            })
            .when_done(move || done_log.lock().push("done".into()))
            .build()
            .unwrap();

        let mut job = interactor.execute(|| Ok(1), observer);
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let cancel_log = log.clone();
        let canceler = thread::spawn(move || {
            job.cancel();
            cancel_log.lock().push("canceled".into());
        });
        thread::sleep(Duration::from_millis(20));
        resume_tx.send(()).unwrap();
        canceler.join().unwrap();

        let log = log.lock().clone();
        let canceled_at = log.iter().position(|e| e == "canceled").unwrap();
        assert_eq!(canceled_at, log.len() - 1, "callback after cancel returned: {log:?}");
        assert_eq!(log[0], "next 1");
    }
}
