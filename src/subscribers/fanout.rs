//! # Delivery of scheduler events to subscribers.
//!
//! ```text
//! Control ── broadcast ──► listener ──┬─ accepts? ─► [lane 1] ─► worker 1 ─► on_event()
//!                                     ├─ accepts? ─► [lane 2] ─► worker 2 ─► on_event()
//!                                     └─ accepts? ─► [lane N] ─► worker N ─► on_event()
//! ```
//!
//! One listener task owns every lane. Lanes are bounded; a full lane drops the
//! event for that subscriber only and publishes `SubscriberOverflow` back on the
//! scheduler channel. When the scheduler cancels the listener, the lanes are
//! closed and the workers finish what is already queued.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::Control;
use crate::error::panic_message;
use crate::events::Event;
use crate::subscribers::Subscribe;

struct Lane {
    sub: Arc<dyn Subscribe>,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Lanes and workers for the subscribers of one scheduler.
pub(crate) struct Fanout {
    lanes: Vec<Lane>,
    workers: JoinSet<()>,
    ctl: Control,
}

impl Fanout {
    /// Spawns one worker per subscriber. Must be called within a tokio runtime.
    pub(crate) fn new(subs: Vec<Arc<dyn Subscribe>>, ctl: Control) -> Self {
        let mut workers = JoinSet::new();
        let lanes = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                workers.spawn(run_lane(Arc::clone(&sub), rx, ctl.clone()));
                Lane { sub, tx }
            })
            .collect();
        Self {
            lanes,
            workers,
            ctl,
        }
    }

    /// Queues `ev` on every lane whose subscriber accepts its kind.
    pub(crate) fn deliver(&self, ev: Event) {
        let ev = Arc::new(ev);
        for lane in self.lanes.iter().filter(|l| l.sub.accepts(ev.kind)) {
            let reason = match lane.tx.try_send(Arc::clone(&ev)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            // an overflow report that overflows is not reported again
            if !ev.is_subscriber_overflow() {
                self.ctl
                    .publish(Event::subscriber_overflow(lane.sub.name(), reason));
            }
        }
    }

    /// Closes every lane and waits until the workers have drained them.
    pub(crate) async fn close(self) {
        let Self {
            lanes, mut workers, ..
        } = self;
        drop(lanes);
        while workers.join_next().await.is_some() {}
    }

    /// Forwards scheduler events to the lanes until `token` is cancelled.
    ///
    /// The receiver is created before this returns, so no event published
    /// afterwards is missed.
    pub(crate) fn listen(self, token: CancellationToken) {
        let mut rx = self.ctl.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.deliver(ev),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            self.close().await;
        });
    }
}

async fn run_lane(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, ctl: Control) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(panic_err) = handled {
            ctl.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(&*panic_err),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::control::Drain;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::{Mutex, Weak};
    use tokio::sync::broadcast::error::TryRecvError;

    struct NoDrain;

    impl Drain for NoDrain {
        fn spawn_drain(self: Arc<Self>) {}
    }

    fn control() -> Control {
        Control::new(1, 16, Weak::<NoDrain>::new())
    }

    struct Recorder {
        seen: Arc<Mutex<Vec<EventKind>>>,
        tasks_only: bool,
        capacity: usize,
    }

    impl Recorder {
        fn new(
            tasks_only: bool,
            capacity: usize,
        ) -> (Arc<dyn Subscribe>, Arc<Mutex<Vec<EventKind>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let rec = Self {
                seen: seen.clone(),
                tasks_only,
                capacity,
            };
            (Arc::new(rec), seen)
        }
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }

        fn accepts(&self, kind: EventKind) -> bool {
            !self.tasks_only
                || matches!(
                    kind,
                    EventKind::TaskDispatched | EventKind::TaskCompleted | EventKind::TaskFailed
                )
        }

        fn name(&self) -> &'static str {
            "recorder"
        }

        fn queue_capacity(&self) -> usize {
            self.capacity
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _event: &Event) {
            panic!("subscriber exploded");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    #[tokio::test]
    async fn test_lanes_keep_order_and_apply_filters() {
        let (all, seen_all) = Recorder::new(false, 16);
        let (tasks, seen_tasks) = Recorder::new(true, 16);
        let fanout = Fanout::new(vec![all, tasks], control());

        for kind in [
            EventKind::Launched,
            EventKind::TaskDispatched,
            EventKind::Paused,
            EventKind::TaskCompleted,
        ] {
            fanout.deliver(Event::new(kind));
        }
        fanout.close().await;

        assert_eq!(
            *seen_all.lock().unwrap(),
            vec![
                EventKind::Launched,
                EventKind::TaskDispatched,
                EventKind::Paused,
                EventKind::TaskCompleted
            ]
        );
        assert_eq!(
            *seen_tasks.lock().unwrap(),
            vec![EventKind::TaskDispatched, EventKind::TaskCompleted]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported() {
        let ctl = control();
        let mut rx = ctl.subscribe();
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Panicker)];
        let fanout = Fanout::new(subs, ctl.clone());

        fanout.deliver(Event::new(EventKind::Launched));
        fanout.close().await;

        let ev = rx.recv().await.expect("panic event");
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.source.as_deref(), Some("panicker"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber exploded"));
    }

    #[tokio::test]
    async fn test_full_lane_reports_overflow_once() {
        let ctl = control();
        let mut rx = ctl.subscribe();
        let (rec, seen) = Recorder::new(false, 1);
        let fanout = Fanout::new(vec![rec], ctl.clone());

        // the worker has not run yet, so the single slot stays occupied
        fanout.deliver(Event::new(EventKind::Launched));
        fanout.deliver(Event::new(EventKind::Paused));
        fanout.deliver(Event::subscriber_overflow("other", "full"));

        let ev = rx.try_recv().expect("overflow event");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.source.as_deref(), Some("recorder"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        fanout.close().await;
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::Launched]);
    }

    #[tokio::test]
    async fn test_listener_forwards_until_cancelled() {
        let ctl = control();
        let (rec, seen) = Recorder::new(false, 16);
        let token = CancellationToken::new();
        Fanout::new(vec![rec], ctl.clone()).listen(token.clone());

        ctl.publish(Event::new(EventKind::Launched));
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        token.cancel();
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        ctl.publish(Event::new(EventKind::Stopped));
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }

        assert_eq!(*seen.lock().unwrap(), vec![EventKind::Launched]);
    }
}
