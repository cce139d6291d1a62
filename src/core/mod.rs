//! Runtime core: drain loop, slots and lifecycle.
//!
//! The public API from this module is [`Scheduler`] (built with
//! [`SchedulerBuilder`]) and its non-generic handle [`Control`].
//!
//! Internal modules:
//! - [`control`]: lifecycle flags, slot counter and drain-loop claim;
//! - [`scheduler`]: the drain loop and the public scheduler surface;
//! - [`runner`]: runs one dispatched task to settlement and invokes hooks;
//! - [`builder`]: validates configuration and wires bus, listener and hooks;
//! - [`config`]: [`SchedulerConfig`] and its defaults.

mod builder;
mod config;
pub(crate) mod control;
mod runner;
mod scheduler;

pub use builder::SchedulerBuilder;
pub use config::{DEFAULT_BUS_CAPACITY, DEFAULT_LIMIT, SchedulerConfig};
pub use control::Control;
pub use runner::Completion;
pub use scheduler::{CompletedHook, ExhaustedHook, Scheduler};
