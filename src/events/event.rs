//! # Runtime events emitted by the scheduler.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: launch/stop/pause/resume and limit changes
//! - **Dispatch events**: a task was handed to the executor or has settled
//! - **Isolation events**: a hook, executor, or subscriber panicked and was recovered
//!
//! The [`Event`] struct carries additional metadata such as timestamps, dispatch tickets,
//! slot occupancy, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use taskpool::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_ticket(7)
//!     .with_reason("boom")
//!     .with_slots(1, 4);
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.ticket, Some(7));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,

    // === Lifecycle events ===
    /// `launch()` switched the scheduler from stopped to launched.
    Launched,

    /// `stop()` switched the scheduler from launched to stopped.
    ///
    /// In-flight tasks keep running; only further pulls are prevented.
    Stopped,

    /// `pause()` switched the scheduler from running to paused.
    Paused,

    /// `start()` cleared the paused flag of a launched scheduler.
    Resumed,

    /// The concurrency limit was changed.
    ///
    /// Sets:
    /// - `running`, `limit`: slot occupancy after the change
    LimitChanged,

    // === Dispatch events ===
    /// A pulled task was handed to the executor.
    ///
    /// Sets:
    /// - `ticket`: dispatch number
    /// - `running`, `limit`: slot occupancy after the dispatch
    TaskDispatched,

    /// A dispatched task settled successfully.
    ///
    /// Sets:
    /// - `ticket`: dispatch number
    /// - `running`, `limit`: slot occupancy after the slot was released
    TaskCompleted,

    /// A dispatched task settled with an error.
    ///
    /// Sets:
    /// - `ticket`: dispatch number
    /// - `reason`: failure message
    /// - `running`, `limit`: slot occupancy after the slot was released
    TaskFailed,

    /// The task source reported that no task is available right now.
    ///
    /// The scheduler pauses itself; a later `start()` resumes draining.
    SourceExhausted,

    // === Isolation events ===
    /// A completion or exhaustion hook, or the source's `pull`, panicked; the
    /// scheduler kept going. A panicking `pull` counts as an exhausted source.
    ///
    /// Sets:
    /// - `source`: `"on_completed"`, `"on_exhausted"` or `"pull"`
    /// - `ticket`: dispatch number (completion hook only)
    /// - `reason`: panic info/message
    HookPanicked,

    /// The default executor caught a panic while invoking a callable task.
    ///
    /// The task settles with an absent result.
    ///
    /// Sets:
    /// - `source`: task name
    /// - `reason`: panic info/message
    ExecutorPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Dispatch number of the task this event refers to.
    pub ticket: Option<u64>,
    /// Number of occupied slots when the event was emitted.
    pub running: Option<u32>,
    /// Concurrency limit when the event was emitted.
    pub limit: Option<u32>,
    /// Emitting component (subscriber, hook, or task name).
    pub source: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            ticket: None,
            running: None,
            limit: None,
            source: None,
            reason: None,
        }
    }

    /// Attaches a dispatch ticket.
    #[inline]
    pub fn with_ticket(mut self, ticket: u64) -> Self {
        self.ticket = Some(ticket);
        self
    }

    /// Attaches slot occupancy (clamped to `u32`).
    #[inline]
    pub fn with_slots(mut self, running: usize, limit: usize) -> Self {
        self.running = Some(u32::try_from(running).unwrap_or(u32::MAX));
        self.limit = Some(u32::try_from(limit).unwrap_or(u32::MAX));
        self
    }

    /// Attaches the emitting component name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    /// Creates a hook panic event.
    #[inline]
    pub fn hook_panicked(hook: &'static str, info: String) -> Self {
        Event::new(EventKind::HookPanicked)
            .with_source(hook)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_panic(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberPanicked | EventKind::HookPanicked | EventKind::ExecutorPanicked
        )
    }
}
