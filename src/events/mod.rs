//! Scheduler events.
//!
//! [`Event`] and [`EventKind`] describe everything a scheduler reports: lifecycle
//! transitions, dispatches and settlements, exhaustion, and recovered panics.
//! Events are published on the scheduler's broadcast channel; obtain a receiver
//! with `Scheduler::subscribe()` or register a [`Subscribe`](crate::Subscribe)
//! implementation on the builder.
//!
//! ## Publishers
//! - `Control`: lifecycle and limit changes, `SourceExhausted`
//! - `core::runner`: dispatch, settlement, hook panics
//! - `DefaultExecutor`: invocation panics
//! - subscriber workers: overflow and panics

mod event;

pub use event::{Event, EventKind};
