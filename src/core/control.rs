//! # Control: lifecycle flags and concurrency slots.
//!
//! [`Control`] is the non-generic half of a scheduler. It owns the state that the
//! drain loop, the dispatched tasks and the public control methods all mutate:
//!
//! ```text
//! State (one mutex)
//!   ├─ launched / paused      lifecycle flags
//!   ├─ running / limit        slot counter and ceiling
//!   ├─ draining               at most one drain loop pulls at a time
//!   └─ epoch                  bumped by every start(); detects resumes during a pull
//! ```
//!
//! ## Rules
//! - `running` is only incremented by [`Control::acquire`] (drain loop) and only
//!   decremented by releasing a [`SlotPermit`] (settlement).
//! - Claiming the drain loop and releasing it happen under the same lock as the
//!   slot counter, so a settlement can never miss a loop that is about to exit.
//! - Lowering the limit never cancels work: `running` may exceed `limit` until
//!   enough tasks settle, and `idle_capacity` saturates at zero meanwhile.
//! - A drain loop is spawned through a [`Weak`] handle; once the scheduler is
//!   dropped, resume attempts become no-ops.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{Notify, broadcast};

use crate::core::config::validate_limit;
use crate::error::SchedulerError;
use crate::events::{Event, EventKind};

/// Spawns the drain loop of a concrete scheduler.
pub(crate) trait Drain: Send + Sync + 'static {
    fn spawn_drain(self: Arc<Self>);
}

#[derive(Debug)]
struct State {
    launched: bool,
    paused: bool,
    draining: bool,
    limit: usize,
    running: usize,
    epoch: u64,
    next_ticket: u64,
}

impl State {
    fn idle_capacity(&self) -> usize {
        self.limit.saturating_sub(self.running)
    }

    fn allow_execute(&self) -> bool {
        self.launched && !self.paused
    }

    fn can_continue(&self) -> bool {
        self.allow_execute() && self.idle_capacity() > 0
    }
}

struct Shared {
    state: Mutex<State>,
    events: broadcast::Sender<Event>,
    settled: Notify,
    driver: Weak<dyn Drain>,
}

/// Handle to the lifecycle and slot state of a scheduler.
///
/// Cheap to clone. Task sources, executors and hooks receive a `&Control`
/// so they can observe capacity or steer the scheduler without knowing its
/// concrete source and result types.
#[derive(Clone)]
pub struct Control {
    shared: Arc<Shared>,
}

impl Control {
    /// `capacity` bounds the event ring buffer shared by every receiver (min 1).
    pub(crate) fn new(limit: usize, capacity: usize, driver: Weak<dyn Drain>) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    launched: false,
                    paused: true,
                    draining: false,
                    limit,
                    running: 0,
                    epoch: 0,
                    next_ticket: 0,
                }),
                events,
                settled: Notify::new(),
                driver,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ---- lifecycle ----

    /// Marks the scheduler as launched and attempts to start draining.
    ///
    /// Idempotent. Must be called within a tokio runtime.
    pub fn launch(&self) {
        let changed = {
            let mut st = self.state();
            !std::mem::replace(&mut st.launched, true)
        };
        if changed {
            self.publish(Event::new(EventKind::Launched));
        }
        self.start();
    }

    /// Marks the scheduler as stopped.
    ///
    /// In-flight tasks run to completion; no further pulls happen until the
    /// next [`launch`](Self::launch).
    pub fn stop(&self) {
        let changed = std::mem::replace(&mut self.state().launched, false);
        if changed {
            self.publish(Event::new(EventKind::Stopped));
        }
    }

    /// Clears the paused flag and begins or resumes the drain loop.
    ///
    /// No-op if the scheduler is not launched. If a drain loop is already
    /// active, it simply keeps going.
    pub fn start(&self) {
        let resumed = {
            let mut st = self.state();
            if !st.launched {
                return;
            }
            st.epoch = st.epoch.wrapping_add(1);
            std::mem::replace(&mut st.paused, false)
        };
        if resumed {
            self.publish(Event::new(EventKind::Resumed));
        }
        self.kick();
    }

    /// Stops pulling new tasks; already dispatched work continues.
    pub fn pause(&self) {
        let changed = !std::mem::replace(&mut self.state().paused, true);
        if changed {
            self.publish(Event::new(EventKind::Paused));
        }
    }

    /// Changes the concurrency limit.
    ///
    /// Raising the limit immediately tries to fill the new slots. Lowering it
    /// never interrupts running tasks.
    pub fn set_limit(&self, limit: usize) -> Result<(), SchedulerError> {
        validate_limit(limit)?;
        let running = {
            let mut st = self.state();
            st.limit = limit;
            st.running
        };
        self.publish(Event::new(EventKind::LimitChanged).with_slots(running, limit));
        self.kick();
        Ok(())
    }

    // ---- observers ----

    /// Current concurrency limit.
    pub fn limit(&self) -> usize {
        self.state().limit
    }

    /// Number of dispatched tasks that have not settled yet.
    pub fn running(&self) -> usize {
        self.state().running
    }

    /// `true` while at least one slot is free.
    pub fn is_idle(&self) -> bool {
        let st = self.state();
        st.running < st.limit
    }

    /// `true` when every slot is taken.
    pub fn is_full(&self) -> bool {
        !self.is_idle()
    }

    /// Number of free slots.
    pub fn idle_capacity(&self) -> usize {
        self.state().idle_capacity()
    }

    /// `true` when launched, not paused, and at least one task is in flight.
    pub fn is_executing(&self) -> bool {
        let st = self.state();
        st.allow_execute() && st.running > 0
    }

    /// `true` when the drain loop may pull another task right now.
    pub fn can_continue(&self) -> bool {
        self.state().can_continue()
    }

    pub fn is_launched(&self) -> bool {
        self.state().launched
    }

    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    /// Resolves once no dispatched task is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.running() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Creates a receiver for events published from now on.
    ///
    /// Receivers share one bounded ring buffer; a receiver that falls behind
    /// gets `RecvError::Lagged` and skips the oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.events.subscribe()
    }

    // ---- drain loop plumbing ----

    /// Sends `ev` to current receivers; dropped when nobody listens.
    pub(crate) fn publish(&self, ev: Event) {
        let _ = self.shared.events.send(ev);
    }

    /// Spawns a drain loop unless one is active or nothing may be pulled.
    pub(crate) fn kick(&self) {
        let claimed = {
            let mut st = self.state();
            if st.draining || !st.can_continue() {
                false
            } else {
                st.draining = true;
                true
            }
        };
        if !claimed {
            return;
        }
        match self.shared.driver.upgrade() {
            Some(driver) => driver.spawn_drain(),
            None => self.state().draining = false,
        }
    }

    /// Checked by the drain loop before each pull.
    ///
    /// Returns the current epoch if the loop may continue; otherwise gives up
    /// the drain claim and returns `None`.
    pub(crate) fn continue_or_release(&self) -> Option<u64> {
        let mut st = self.state();
        if st.can_continue() {
            Some(st.epoch)
        } else {
            st.draining = false;
            None
        }
    }

    /// Handles an exhausted pull that started at `epoch`.
    ///
    /// Returns `true` if the scheduler paused. Returns `false` when a `start()`
    /// arrived while the pull was in progress; the loop should pull again.
    pub(crate) fn exhaust(&self, epoch: u64) -> bool {
        {
            let mut st = self.state();
            if st.epoch != epoch && st.can_continue() {
                return false;
            }
            st.paused = true;
            st.draining = false;
        }
        self.publish(Event::new(EventKind::SourceExhausted));
        true
    }

    /// Takes one slot for a pulled task.
    ///
    /// Always succeeds: the task has already left its source and must run.
    pub(crate) fn acquire(&self) -> SlotPermit {
        let (ticket, running, limit) = {
            let mut st = self.state();
            st.running += 1;
            let ticket = st.next_ticket;
            st.next_ticket = st.next_ticket.wrapping_add(1);
            (ticket, st.running, st.limit)
        };
        self.publish(
            Event::new(EventKind::TaskDispatched)
                .with_ticket(ticket)
                .with_slots(running, limit),
        );
        SlotPermit {
            control: self.clone(),
            ticket,
            held: true,
        }
    }

    fn release_slot(&self) -> (usize, usize) {
        let slots = {
            let mut st = self.state();
            st.running = st.running.saturating_sub(1);
            (st.running, st.limit)
        };
        self.shared.settled.notify_waiters();
        slots
    }
}

/// One occupied concurrency slot.
///
/// Released explicitly on settlement, or on drop if the dispatched task is
/// torn down by the runtime before it settles.
pub(crate) struct SlotPermit {
    control: Control,
    ticket: u64,
    held: bool,
}

impl SlotPermit {
    pub(crate) fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Frees the slot and returns `(running, limit)` after the release.
    pub(crate) fn release(mut self) -> (usize, usize) {
        self.held = false;
        self.control.release_slot()
    }
}

impl Drop for SlotPermit {
    fn drop(&mut self) {
        if self.held {
            self.control.release_slot();
        }
    }
}
