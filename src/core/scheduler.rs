//! # Scheduler: drains a task source through a bounded number of slots.
//!
//! The [`Scheduler`] owns a [`TaskSource`], an [`Executor`] and two optional
//! hooks. Lifecycle and slot state live in the shared [`Control`].
//!
//! ## High-level architecture
//! ```text
//! launch() / start() / add() / set_limit() / settlement
//!        └──► Control::kick()  ── claims the single drain loop ──► tokio::spawn(drain)
//!
//! drain loop (one at a time):
//!   while can_continue:
//!       source.pull(&ctl).await
//!         ├─ Exhausted   → paused = true ─► publish SourceExhausted ─► on_exhausted
//!         │                (stop looping; a pause, not a shutdown)
//!         └─ Ready(task) → running += 1 ─► publish TaskDispatched
//!                          └──► tokio::spawn(run_task)
//!                                  executor.execute(task).await
//!                                  running -= 1 ─► TaskCompleted/TaskFailed ─► on_completed
//!                                  └──► Control::kick()  (refill the freed slot)
//!
//! Event flow:
//!   Control / drain loop / run_task ── publish ──► broadcast ──► fan-out listener ──► subscribers
//! ```
//!
//! ## Rules
//! - The source is never pulled concurrently: at most one drain loop exists.
//! - A pulled task is dispatched exactly once, even if the scheduler was paused
//!   or stopped while the pull was in progress.
//! - Exhaustion pauses the scheduler; the next `start()` resumes pulling.
//! - Tasks are never cancelled. `stop()` and `pause()` only prevent new pulls.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio::sync::mpsc;
//! use taskpool::{OrderedQueue, Scheduler, Work};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), taskpool::SchedulerError> {
//! let (tx, mut rx) = mpsc::unbounded_channel();
//!
//! let sched = Scheduler::builder(OrderedQueue::<Work<u32>>::new())
//!     .with_limit(2)
//!     .on_completed(move |done, _sched| {
//!         if let Some(Some(n)) = done.result() {
//!             let _ = tx.send(*n);
//!         }
//!     })
//!     .build()?;
//!
//! sched.add([
//!     Work::value(1),
//!     Work::call("slow", || async {
//!         tokio::time::sleep(Duration::from_millis(5)).await;
//!         Ok(2)
//!     }),
//! ]);
//! sched.launch();
//!
//! let mut results = vec![rx.recv().await, rx.recv().await];
//! results.sort();
//! assert_eq!(results, vec![Some(1), Some(2)]);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::core::builder::SchedulerBuilder;
use crate::core::control::{Control, Drain};
use crate::core::runner::{self, Completion};
use crate::error::{SchedulerError, panic_message};
use crate::events::Event;
use crate::sources::{Pull, TaskSource};
use crate::tasks::{DefaultExecutor, Executor, Work};

/// Hook invoked once per dispatched task after it settles.
pub type CompletedHook<S, R> =
    Arc<dyn Fn(Completion<<S as TaskSource>::Task, R>, &Scheduler<S, R>) + Send + Sync>;

/// Hook invoked each time the source reports exhaustion.
pub type ExhaustedHook<S, R> = Arc<dyn Fn(&Scheduler<S, R>) + Send + Sync>;

pub(crate) struct Inner<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    pub(crate) control: Control,
    pub(crate) source: S,
    pub(crate) executor: Arc<dyn Executor<S::Task, R>>,
    pub(crate) completed: Option<CompletedHook<S, R>>,
    pub(crate) exhausted: Option<ExhaustedHook<S, R>>,
    /// Stops the subscriber listener once the scheduler is gone.
    pub(crate) listener: Option<CancellationToken>,
}

impl<S, R> Drop for Inner<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    fn drop(&mut self) {
        if let Some(token) = &self.listener {
            token.cancel();
        }
    }
}

impl<S, R> Drain for Inner<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    fn spawn_drain(self: Arc<Self>) {
        tokio::spawn(Scheduler { inner: self }.drain());
    }
}

/// Bounded-concurrency scheduler over a [`TaskSource`].
///
/// Cheap to clone; all clones drive the same scheduler. Created through
/// [`Scheduler::builder`] or [`Scheduler::builder_with`].
pub struct Scheduler<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    pub(crate) inner: Arc<Inner<S, R>>,
}

impl<S, R> Clone for Scheduler<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, R> fmt::Debug for Scheduler<S, R>
where
    S: TaskSource + fmt::Debug,
    R: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctl = self.control();
        f.debug_struct("Scheduler")
            .field("source", &self.inner.source)
            .field("launched", &ctl.is_launched())
            .field("paused", &ctl.is_paused())
            .field("running", &ctl.running())
            .field("limit", &ctl.limit())
            .finish()
    }
}

impl<S, V> Scheduler<S, Option<V>>
where
    S: TaskSource<Task = Work<V>>,
    V: Send + Sync + 'static,
{
    /// Starts building a scheduler for [`Work`] tasks with the [`DefaultExecutor`].
    ///
    /// Values are passed through as results; callables are invoked and awaited.
    pub fn builder(source: S) -> SchedulerBuilder<S, Option<V>> {
        SchedulerBuilder::new(source, Arc::new(DefaultExecutor))
    }
}

impl<S, R> Scheduler<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    /// Starts building a scheduler with a custom executor.
    pub fn builder_with<E>(source: S, executor: E) -> SchedulerBuilder<S, R>
    where
        E: Executor<S::Task, R>,
    {
        SchedulerBuilder::new(source, Arc::new(executor))
    }

    // ---- lifecycle ----

    /// Marks the scheduler as launched and starts draining.
    ///
    /// Idempotent. Must be called within a tokio runtime.
    pub fn launch(&self) {
        self.control().launch();
    }

    /// Stops pulling new tasks until the next [`launch`](Self::launch).
    ///
    /// In-flight tasks run to completion.
    pub fn stop(&self) {
        self.control().stop();
    }

    /// Resumes draining after a pause or exhaustion. No-op if not launched.
    pub fn start(&self) {
        self.control().start();
    }

    /// Stops pulling new tasks; dispatched work continues.
    pub fn pause(&self) {
        self.control().pause();
    }

    /// Changes the concurrency limit; a raise fills the new slots immediately.
    pub fn set_limit(&self, limit: usize) -> Result<(), SchedulerError> {
        self.control().set_limit(limit)
    }

    // ---- observers ----

    pub fn limit(&self) -> usize {
        self.control().limit()
    }

    pub fn running(&self) -> usize {
        self.control().running()
    }

    pub fn is_idle(&self) -> bool {
        self.control().is_idle()
    }

    pub fn is_full(&self) -> bool {
        self.control().is_full()
    }

    pub fn idle_capacity(&self) -> usize {
        self.control().idle_capacity()
    }

    pub fn is_executing(&self) -> bool {
        self.control().is_executing()
    }

    pub fn can_continue(&self) -> bool {
        self.control().can_continue()
    }

    pub fn is_launched(&self) -> bool {
        self.control().is_launched()
    }

    pub fn is_paused(&self) -> bool {
        self.control().is_paused()
    }

    /// Resolves once no dispatched task is in flight.
    pub async fn wait_idle(&self) {
        self.control().wait_idle().await;
    }

    /// Creates a receiver for subsequent scheduler events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.control().subscribe()
    }

    /// Non-generic handle shared with sources, executors and hooks.
    pub fn control(&self) -> &Control {
        &self.inner.control
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    // ---- drain loop ----

    /// Pulls and dispatches until the scheduler may not continue or the
    /// source is exhausted. Entered only through [`Control::kick`].
    async fn drain(self) {
        let ctl = self.control();
        while let Some(epoch) = ctl.continue_or_release() {
            match self.pull(ctl).await {
                Pull::Exhausted => {
                    if ctl.exhaust(epoch) {
                        runner::run_exhausted_hook(&self);
                        return;
                    }
                }
                Pull::Ready(task) => {
                    let permit = ctl.acquire();
                    tokio::spawn(runner::run_task(self.clone(), task, permit));
                }
            }
        }
    }

    /// A panicking source is treated as exhausted.
    async fn pull(&self, ctl: &Control) -> Pull<S::Task> {
        let pull = AssertUnwindSafe(self.inner.source.pull(ctl));
        match pull.catch_unwind().await {
            Ok(res) => res,
            Err(panic_err) => {
                ctl.publish(Event::hook_panicked("pull", panic_message(&*panic_err)));
                Pull::Exhausted
            }
        }
    }
}
