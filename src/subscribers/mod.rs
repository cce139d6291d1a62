//! # Event subscribers.
//!
//! [`Subscribe`] is the user-facing observer trait. Subscribers passed to
//! [`SchedulerBuilder::with_subscribers`](crate::SchedulerBuilder::with_subscribers)
//! are served by an internal fan-out: one bounded lane and one worker each.
//!
//! ```text
//!   Control::publish ──► broadcast ──► listener ──┬──► LogWriter
//!                                                 ├──► Metrics
//!                                                 └──► Custom
//! ```
//!
//! With the `logging` feature, [`LogWriter`] forwards events to `tracing`.

mod fanout;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub(crate) use fanout::Fanout;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
