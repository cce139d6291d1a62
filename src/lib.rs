//! # taskpool
//!
//! **Taskpool** is a bounded-concurrency task scheduler for tokio.
//!
//! It pulls work items one at a time from a pluggable [`TaskSource`], runs up
//! to a configurable number of them concurrently through an [`Executor`], and
//! reports every settlement to a completion hook. When the source runs dry the
//! scheduler pauses and resumes as soon as new work is offered.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ OrderedQueue │   │CallbackSource│   │ custom source│
//!     │ (priorities) │   │  (get_task)  │   │ (TaskSource) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            └──────────────────┼──────────────────┘
//!                               ▼ pull (one at a time)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (drain loop)                                           │
//! │  - Control (launched / paused / running / limit)                  │
//! │  - Executor (task ─► result)                                      │
//! │  - on_completed / on_exhausted hooks                              │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │   run_task   │   │   run_task   │   │   run_task   │   │
//!     │   (slot 1)   │   │   (slot 2)   │   │  (slot N)    │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ TaskCompleted    │ TaskFailed       │ ...             │ Launched, Paused,
//!      │                  │                  │                 │ SourceExhausted, ...
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                  Control::publish (broadcast channel)             │
//! │              (capacity: SchedulerConfig::bus_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │   fan-out listener     │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                        accepts(kind)? per lane
//!                          (bounded queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                     worker1    worker2    workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! build() ──► (launched=false, paused=true)
//!    │
//! launch() ──► launched=true ──► start() ──► paused=false ──► drain loop
//!
//! drain loop {
//!   ├─► while launched && !paused && running < limit
//!   ├─► source.pull(&ctl)
//!   │       ├─ Exhausted ──► paused=true, publish SourceExhausted, on_exhausted, exit
//!   │       └─ Ready     ──► running += 1, publish TaskDispatched, spawn run_task
//!   └─ exit conditions:
//!        - stop() or pause()
//!        - every slot taken (a settlement re-enters the loop)
//!        - source exhausted (add() / set_get_task() / start() re-enter the loop)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                           |
//! |-------------------|--------------------------------------------------------------|----------------------------------------------|
//! | **Scheduling**    | Bounded drain loop with mutable limit and pause/resume.      | [`Scheduler`], [`Control`]                   |
//! | **Sources**       | Pull contract plus queue and callback implementations.       | [`TaskSource`], [`OrderedQueue`], [`CallbackSource`] |
//! | **Tasks**         | Ready-made task type and executors.                          | [`Work`], [`Executor`], [`ExecutorFn`]       |
//! | **Subscriber API**| Hook into scheduler events (logging, metrics, custom).       | [`Subscribe`], [`Event`]                     |
//! | **Errors**        | Typed errors for configuration and task execution.           | [`SchedulerError`], [`TaskError`]            |
//! | **Configuration** | Centralize scheduler settings.                               | [`SchedulerConfig`]                          |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber that forwards events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taskpool::{OrderedQueue, Scheduler, Subscribe, Work};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(taskpool::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let sched = Scheduler::builder(OrderedQueue::new())
//!         .with_limit(2)
//!         .with_subscribers(subs)
//!         .on_completed(|done, _sched| println!("#{} -> {:?}", done.ticket, done.outcome))
//!         .build()?;
//!
//!     sched.add((0..5u64).map(|n| {
//!         Work::call(format!("job-{n}"), move || async move {
//!             tokio::time::sleep(Duration::from_millis(10 * n)).await;
//!             Ok(n * n)
//!         })
//!     }));
//!     sched.launch();
//!
//!     tokio::time::sleep(Duration::from_millis(1)).await;
//!     sched.wait_idle().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod sources;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    CompletedHook, Completion, Control, DEFAULT_BUS_CAPACITY, DEFAULT_LIMIT, ExhaustedHook,
    Scheduler, SchedulerBuilder, SchedulerConfig,
};
pub use error::{SchedulerError, TaskError};
pub use events::{Event, EventKind};
pub use sources::{
    CallbackSource, Comparator, GetTask, OrderedQueue, Pull, QueueSource, TaskSource,
};
pub use subscribers::Subscribe;
pub use tasks::{DefaultExecutor, Executor, ExecutorFn, Job, Work};

// Optional: expose a tracing-backed logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
