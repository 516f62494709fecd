//! Concurrency bridge between the request layer and the drawing thread.
//!
//! Exactly one execution context (the drawing thread) may touch device
//! state. Concurrent callers post a deferred unit of work into a capacity-1
//! task slot; the drawing thread drains it at its next idle point and
//! signals a per-task completion the caller can block on. The capacity-1
//! constraint is enforced by the type: posting while a task is queued fails
//! with [`BridgeError::Busy`] instead of racing on a shared slot.

use log::warn;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex};
use thiserror::Error;

/// Failure of a deferred unit of work, delivered through its completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task returned an error.
    #[error("deferred task failed: {0}")]
    Failed(String),
    /// The task panicked. The slot is freed and later tasks still run.
    #[error("deferred task panicked")]
    Panicked,
}

/// Outcome of one deferred unit of work.
pub type TaskResult = Result<(), TaskError>;

/// Errors raised when posting a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// A task is already queued; the capacity-1 slot rejects a second one.
    #[error("a deferred task is already queued")]
    Busy,
}

type Task = Box<dyn FnOnce() -> TaskResult + Send + 'static>;

#[derive(Debug, Default)]
struct CompletionState {
    result: Mutex<Option<TaskResult>>,
    signal: Condvar,
}

/// Completion signal for one posted task.
///
/// Cloneable: any number of waiters may block on the same task; all of them
/// return strictly after the task has finished on the drawing thread.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    state: Arc<CompletionState>,
}

impl Completion {
    /// Blocks until the task has finished and returns its outcome.
    /// No timeout, no cancellation; waiting only ever happens off the
    /// drawing thread.
    pub fn wait(&self) -> TaskResult {
        let mut result = recover(self.state.result.lock());
        while result.is_none() {
            result = recover(self.state.signal.wait(result));
        }
        (*result).clone().unwrap_or(Err(TaskError::Panicked))
    }

    /// Non-blocking probe.
    pub fn is_done(&self) -> bool {
        recover(self.state.result.lock()).is_some()
    }

    fn finish(&self, outcome: TaskResult) {
        *recover(self.state.result.lock()) = Some(outcome);
        self.state.signal.notify_all();
    }
}

/// The capacity-1 deferred task slot shared between the request layer and
/// the drawing thread.
#[derive(Clone, Default)]
pub struct TaskSlot {
    pending: Arc<Mutex<Option<(Task, Completion)>>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one unit of work for the drawing thread.
    ///
    /// Fails with [`BridgeError::Busy`] while another task is still queued;
    /// callers serialize their requests and retry.
    pub fn post(
        &self,
        task: impl FnOnce() -> TaskResult + Send + 'static,
    ) -> Result<Completion, BridgeError> {
        let mut slot = recover(self.pending.lock());
        if slot.is_some() {
            return Err(BridgeError::Busy);
        }
        let completion = Completion::default();
        *slot = Some((Box::new(task), completion.clone()));
        Ok(completion)
    }

    /// True when no task is queued.
    pub fn is_idle(&self) -> bool {
        recover(self.pending.lock()).is_none()
    }

    /// Runs the queued task, if any. Called by the drawing thread at an
    /// idle point in its own loop; never by concurrent callers.
    ///
    /// The completion is signalled on every exit path: a panicking task is
    /// caught and surfaced as [`TaskError::Panicked`], and the slot is free
    /// again afterwards.
    pub fn run_pending(&self) -> bool {
        let taken = recover(self.pending.lock()).take();
        let Some((task, completion)) = taken else {
            return false;
        };
        let outcome = match catch_unwind(AssertUnwindSafe(task)) {
            Ok(result) => result,
            Err(_) => {
                warn!("deferred task panicked");
                Err(TaskError::Panicked)
            }
        };
        completion.finish(outcome);
        true
    }
}

/// Keeps the bridge usable when a lock holder panicked; the protected data
/// is a plain slot/result and stays consistent.
fn recover<G>(locked: Result<G, std::sync::PoisonError<G>>) -> G {
    locked.unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn task_runs_on_the_draining_thread_only() {
        let slot = TaskSlot::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let completion = slot
            .post(move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!completion.is_done());

        assert!(slot.run_pending());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(completion.wait(), Ok(()));
        assert!(!slot.run_pending());
    }

    #[test]
    fn second_post_rejected_while_pending() {
        let slot = TaskSlot::new();
        let _first = slot.post(|| Ok(())).unwrap();
        assert_eq!(slot.post(|| Ok(())).unwrap_err(), BridgeError::Busy);
        slot.run_pending();
        assert!(slot.is_idle());
        assert!(slot.post(|| Ok(())).is_ok());
    }

    #[test]
    fn all_waiters_return_after_completion() {
        let slot = TaskSlot::new();
        let order = Arc::new(AtomicUsize::new(0));

        let task_order = Arc::clone(&order);
        let completion = slot
            .post(move || {
                task_order.store(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        let mut waiters = Vec::new();
        for _ in 0..2 {
            let completion = completion.clone();
            let order = Arc::clone(&order);
            waiters.push(thread::spawn(move || {
                assert_eq!(completion.wait(), Ok(()));
                // The task's effect is visible to every waiter.
                assert_eq!(order.load(Ordering::SeqCst), 1);
            }));
        }

        slot.run_pending();
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }

    #[test]
    fn tasks_never_overlap() {
        let slot = TaskSlot::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let l = Arc::clone(&log);
        let first = slot
            .post(move || {
                l.lock().unwrap().push("first");
                Ok(())
            })
            .unwrap();
        slot.run_pending();
        first.wait().unwrap();

        let l = Arc::clone(&log);
        let second = slot
            .post(move || {
                l.lock().unwrap().push("second");
                Ok(())
            })
            .unwrap();
        slot.run_pending();
        second.wait().unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn failure_is_surfaced_not_swallowed() {
        let slot = TaskSlot::new();
        let completion = slot
            .post(|| Err(TaskError::Failed("no such page".into())))
            .unwrap();
        slot.run_pending();
        assert_eq!(
            completion.wait(),
            Err(TaskError::Failed("no such page".into()))
        );
    }

    #[test]
    fn panicking_task_frees_the_slot() {
        let slot = TaskSlot::new();
        let completion = slot.post(|| panic!("boom")).unwrap();
        slot.run_pending();
        assert_eq!(completion.wait(), Err(TaskError::Panicked));

        // The bridge stays usable.
        let after = slot.post(|| Ok(())).unwrap();
        slot.run_pending();
        assert_eq!(after.wait(), Ok(()));
    }

    #[test]
    fn waiters_block_until_the_drain_happens() {
        let slot = TaskSlot::new();
        let completion = slot.post(|| Ok(())).unwrap();

        let waiter = {
            let completion = completion.clone();
            thread::spawn(move || completion.wait())
        };
        // Give the waiter a chance to block, then drain.
        thread::sleep(std::time::Duration::from_millis(20));
        assert!(!completion.is_done());
        slot.run_pending();
        assert_eq!(waiter.join().unwrap(), Ok(()));
    }
}
