//! # Run a single dispatched task to settlement.
//!
//! Every task pulled by the drain loop is spawned as its own tokio task that
//! runs [`run_task`]. It holds one [`SlotPermit`] for its whole lifetime.
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   executor.execute() → Ok(r)     → release slot → publish TaskCompleted → on_completed
//!
//! Failure:
//!   executor.execute() → Err(e)    → release slot → publish TaskFailed    → on_completed
//!
//! Panic inside the executor future:
//!   catch_unwind → Err(Panicked)   → release slot → publish TaskFailed    → on_completed
//!
//! Then, always:
//!   control.kick() → refill the freed slot (no-op if a drain loop is active)
//! ```
//!
//! ## Rules
//! - Publishes **exactly one** terminal event: `TaskCompleted` or `TaskFailed`
//! - The slot is released **before** the completion hook runs
//! - A panicking completion hook is reported as `HookPanicked` and never
//!   prevents the refill

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::core::control::SlotPermit;
use crate::core::scheduler::Scheduler;
use crate::error::{TaskError, panic_message};
use crate::events::{Event, EventKind};
use crate::sources::TaskSource;

/// Outcome of one dispatched task, delivered to the completion hook.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<T, R> {
    /// Dispatch sequence number (matches the `TaskDispatched` event).
    pub ticket: u64,
    /// The task as it was pulled from the source.
    pub task: T,
    /// Executor result or failure.
    pub outcome: Result<R, TaskError>,
}

impl<T, R> Completion<T, R> {
    /// Result value, absent on failure.
    pub fn result(&self) -> Option<&R> {
        self.outcome.as_ref().ok()
    }

    /// Failure, absent on success.
    pub fn error(&self) -> Option<&TaskError> {
        self.outcome.as_ref().err()
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_outcome(self) -> Result<R, TaskError> {
        self.outcome
    }
}

/// Executes `task` and reconciles its slot.
pub(crate) async fn run_task<S, R>(sched: Scheduler<S, R>, task: S::Task, permit: SlotPermit)
where
    S: TaskSource,
    R: Send + 'static,
{
    let ticket = permit.ticket();
    let ctl = sched.control();
    let exec = AssertUnwindSafe(sched.inner.executor.execute(task.clone(), ctl));

    let outcome = match exec.catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => Err(TaskError::Panicked {
            reason: panic_message(&*panic_err),
        }),
    };

    let (running, limit) = permit.release();
    publish_settled(&sched, ticket, &outcome, running, limit);

    if let Some(hook) = &sched.inner.completed {
        let done = Completion {
            ticket,
            task,
            outcome,
        };
        let res = std::panic::catch_unwind(AssertUnwindSafe(|| hook(done, &sched)));
        if let Err(panic_err) = res {
            ctl.publish(
                Event::hook_panicked("on_completed", panic_message(&*panic_err)).with_ticket(ticket),
            );
        }
    }
    ctl.kick();
}

/// Runs the exhaustion hook, reporting a panic instead of propagating it.
pub(crate) fn run_exhausted_hook<S, R>(sched: &Scheduler<S, R>)
where
    S: TaskSource,
    R: Send + 'static,
{
    let Some(hook) = &sched.inner.exhausted else {
        return;
    };
    if let Err(panic_err) = std::panic::catch_unwind(AssertUnwindSafe(|| hook(sched))) {
        sched
            .control()
            .publish(Event::hook_panicked("on_exhausted", panic_message(&*panic_err)));
    }
}

fn publish_settled<S, R>(
    sched: &Scheduler<S, R>,
    ticket: u64,
    outcome: &Result<R, TaskError>,
    running: usize,
    limit: usize,
) where
    S: TaskSource,
    R: Send + 'static,
{
    let ev = match outcome {
        Ok(_) => Event::new(EventKind::TaskCompleted),
        Err(err) => Event::new(EventKind::TaskFailed).with_reason(err.as_message()),
    };
    sched
        .control()
        .publish(ev.with_ticket(ticket).with_slots(running, limit));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_accessors() {
        let ok: Completion<&str, u8> = Completion {
            ticket: 1,
            task: "a",
            outcome: Ok(7),
        };
        assert!(ok.is_ok());
        assert_eq!(ok.result(), Some(&7));
        assert_eq!(ok.error(), None);

        let failed: Completion<&str, u8> = Completion {
            ticket: 2,
            task: "b",
            outcome: Err(TaskError::fail("broken")),
        };
        assert!(!failed.is_ok());
        assert_eq!(failed.result(), None);
        assert_eq!(failed.error(), Some(&TaskError::fail("broken")));
        assert_eq!(failed.into_outcome(), Err(TaskError::fail("broken")));
    }
}
