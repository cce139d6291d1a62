//! # Pull-based task source contract.
//!
//! A [`TaskSource`] hands out tasks one at a time. The scheduler never pulls
//! concurrently from the same source; it pulls again only after the previous
//! pull returned.
//!
//! Unlike an iterator, exhaustion is **temporary**: [`Pull::Exhausted`] means
//! "nothing right now", and the same source may return [`Pull::Ready`] later
//! once new work arrives.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Control;

/// Result of one pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pull<T> {
    /// A task to dispatch.
    Ready(T),
    /// No task is available right now.
    Exhausted,
}

impl<T> Pull<T> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Pull::Exhausted)
    }

    /// Returns the task, if any.
    pub fn into_task(self) -> Option<T> {
        match self {
            Pull::Ready(task) => Some(task),
            Pull::Exhausted => None,
        }
    }
}

impl<T> From<Option<T>> for Pull<T> {
    fn from(task: Option<T>) -> Self {
        match task {
            Some(task) => Pull::Ready(task),
            None => Pull::Exhausted,
        }
    }
}

/// Producer of tasks for a scheduler.
///
/// Implementations may complete synchronously (return without awaiting) or
/// suspend, e.g. while fetching from a remote queue.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use async_trait::async_trait;
/// use taskpool::{Control, Pull, TaskSource};
///
/// /// Yields 0, 1, 2 and then stays exhausted.
/// struct Countdown(AtomicU32);
///
/// #[async_trait]
/// impl TaskSource for Countdown {
///     type Task = u32;
///
///     async fn pull(&self, _ctl: &Control) -> Pull<u32> {
///         let n = self.0.fetch_add(1, Ordering::SeqCst);
///         if n < 3 { Pull::Ready(n) } else { Pull::Exhausted }
///     }
/// }
/// ```
#[async_trait]
pub trait TaskSource: Send + Sync + 'static {
    /// Task type handed to the executor.
    type Task: Clone + Send + Sync + 'static;

    /// Produces the next task, or [`Pull::Exhausted`] if none is available right now.
    async fn pull(&self, ctl: &Control) -> Pull<Self::Task>;
}

#[async_trait]
impl<S> TaskSource for Arc<S>
where
    S: TaskSource + ?Sized,
{
    type Task = S::Task;

    async fn pull(&self, ctl: &Control) -> Pull<Self::Task> {
        (**self).pull(ctl).await
    }
}

#[async_trait]
impl<S> TaskSource for Box<S>
where
    S: TaskSource + ?Sized,
{
    type Task = S::Task;

    async fn pull(&self, ctl: &Control) -> Pull<Self::Task> {
        (**self).pull(ctl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_from_option() {
        assert_eq!(Pull::from(Some(1)), Pull::Ready(1));
        assert_eq!(Pull::<u8>::from(None), Pull::Exhausted);
    }

    #[test]
    fn test_pull_accessors() {
        assert!(Pull::<u8>::Exhausted.is_exhausted());
        assert!(!Pull::Ready(1).is_exhausted());
        assert_eq!(Pull::Ready(1).into_task(), Some(1));
        assert_eq!(Pull::<u8>::Exhausted.into_task(), None);
    }
}
