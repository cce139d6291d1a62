//! # LogWriter - tracing-backed event logger
//!
//! A subscriber that turns incoming [`Event`]s into [`tracing`] records.
//! Routine lifecycle and dispatch events log at `debug`/`info`, failures at
//! `warn`, recovered panics at `error`.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO  taskpool: launched
//! DEBUG taskpool: dispatched ticket=0 running=1 limit=4
//! WARN  taskpool: task failed ticket=3 reason="execution failed: connection refused"
//! INFO  taskpool: source exhausted; scheduler paused
//! ERROR taskpool: hook panicked hook="on_completed" reason="boom"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("unknown");
        let source = e.source.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::Launched => tracing::info!(target: "taskpool", "launched"),
            EventKind::Stopped => tracing::info!(target: "taskpool", "stopped"),
            EventKind::Paused => tracing::info!(target: "taskpool", "paused"),
            EventKind::Resumed => tracing::info!(target: "taskpool", "resumed"),
            EventKind::LimitChanged => {
                tracing::info!(target: "taskpool", running = ?e.running, limit = ?e.limit, "limit changed");
            }
            EventKind::TaskDispatched => {
                tracing::debug!(target: "taskpool", ticket = ?e.ticket, running = ?e.running, limit = ?e.limit, "dispatched");
            }
            EventKind::TaskCompleted => {
                tracing::debug!(target: "taskpool", ticket = ?e.ticket, running = ?e.running, "completed");
            }
            EventKind::TaskFailed => {
                tracing::warn!(target: "taskpool", ticket = ?e.ticket, reason, "task failed");
            }
            EventKind::SourceExhausted => {
                tracing::info!(target: "taskpool", "source exhausted; scheduler paused");
            }
            EventKind::HookPanicked => {
                tracing::error!(target: "taskpool", hook = source, ticket = ?e.ticket, reason, "hook panicked");
            }
            EventKind::ExecutorPanicked => {
                tracing::error!(target: "taskpool", task = source, reason, "executor panicked while invoking task");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "taskpool", subscriber = source, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "taskpool", subscriber = source, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
