//! # Task sources.
//!
//! This module provides the pull contract and its two built-in implementations:
//! - [`TaskSource`] / [`Pull`] - one-at-a-time producer with temporary exhaustion
//! - [`OrderedQueue`] - in-memory queue, optionally kept sorted by a comparator
//! - [`QueueSource`] - owned or `Arc`-shared queue; adds the resuming queue methods
//! - [`CallbackSource`] - delegates every pull to a user function

mod callback;
mod queue;
mod source;

pub use callback::{CallbackSource, GetTask};
pub use queue::{Comparator, OrderedQueue, QueueSource};
pub use source::{Pull, TaskSource};
