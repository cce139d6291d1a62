//! Error types used by the scheduler and by dispatched tasks.
//!
//! This module defines two main error enums:
//!
//! - [`SchedulerError`] - configuration errors raised while building or reconfiguring a scheduler.
//! - [`TaskError`] - errors raised by individual task executions.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by the scheduler itself.
///
/// Returned by [`SchedulerBuilder::build`](crate::SchedulerBuilder::build) and
/// [`Control::set_limit`](crate::Control::set_limit). Nothing at runtime is fatal;
/// these only reject invalid configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Concurrency limit must be a positive integer.
    #[error("invalid concurrency limit {limit}; must be at least 1")]
    InvalidLimit {
        /// The rejected value.
        limit: usize,
    },

    /// Event bus capacity must be a positive integer.
    #[error("invalid bus capacity {capacity}; must be at least 1")]
    InvalidBusCapacity {
        /// The rejected value.
        capacity: usize,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpool::SchedulerError;
    ///
    /// let err = SchedulerError::InvalidLimit { limit: 0 };
    /// assert_eq!(err.as_label(), "scheduler_invalid_limit");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::InvalidLimit { .. } => "scheduler_invalid_limit",
            SchedulerError::InvalidBusCapacity { .. } => "scheduler_invalid_bus_capacity",
        }
    }
}

/// # Errors produced by task execution.
///
/// Delivered to the completion hook through [`Completion::error`](crate::Completion::error);
/// never thrown back into the drain loop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The executor future panicked while the task was running.
    #[error("task panicked: {reason}")]
    Panicked {
        /// Panic payload rendered as text.
        reason: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskpool::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { reason } => format!("panic: {reason}"),
        }
    }
}

/// Renders a panic payload caught by `catch_unwind` as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked { reason: "x".into() }.as_label(),
            "task_panicked"
        );
        assert_eq!(
            SchedulerError::InvalidBusCapacity { capacity: 0 }.as_label(),
            "scheduler_invalid_bus_capacity"
        );
    }

    #[test]
    fn test_display_includes_details() {
        let err = TaskError::fail("connection refused");
        assert_eq!(err.to_string(), "execution failed: connection refused");
        assert_eq!(err.as_message(), "error: connection refused");

        let err = SchedulerError::InvalidLimit { limit: 0 };
        assert_eq!(
            err.to_string(),
            "invalid concurrency limit 0; must be at least 1"
        );
    }

    #[test]
    fn test_panic_message_downcasts() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");

        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");

        let s: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
