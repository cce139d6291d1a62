//! # Observer hook for scheduler events.
//!
//! A [`Subscribe`] implementation is handed to
//! [`SchedulerBuilder::with_subscribers`](crate::SchedulerBuilder::with_subscribers)
//! and from then on receives the events of that scheduler, in publication
//! order, on a worker task of its own.
//!
//! [`Subscribe::accepts`] filters by [`EventKind`] before an event is queued, so a
//! subscriber that only cares about settlements never spends queue space on
//! lifecycle noise.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use async_trait::async_trait;
//! use taskpool::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, _ev: &Event) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn accepts(&self, kind: EventKind) -> bool {
//!         kind == EventKind::TaskFailed
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Receiver of scheduler events.
///
/// `on_event` runs on the subscriber's worker, never inside the drain loop or a
/// dispatched task, so a slow subscriber delays nothing but its own queue. When
/// that queue is full the event is dropped for this subscriber and reported as
/// `SubscriberOverflow`. A panic is reported as `SubscriberPanicked` and the
/// worker moves on to the next event.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Returns `false` for kinds this subscriber never wants queued.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }

    /// Name reported in `SubscriberOverflow` / `SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Bound of the per-subscriber queue (clamped to at least 1).
    fn queue_capacity(&self) -> usize {
        256
    }
}
