//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`] centralized settings for a scheduler instance.
//!
//! Config is consumed by [`SchedulerBuilder`](crate::SchedulerBuilder) and validated
//! once in `build()`. The concurrency limit stays mutable afterwards through
//! [`Control::set_limit`](crate::Control::set_limit).

use crate::error::SchedulerError;

/// Default number of concurrency slots.
pub const DEFAULT_LIMIT: usize = 4;

/// Default capacity of the event bus ring buffer.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Configuration for a scheduler.
///
/// ## Field semantics
/// - `limit`: maximum number of tasks dispatched at the same time (must be `>= 1`)
/// - `bus_capacity`: event bus ring buffer size (must be `>= 1`)
///
/// ## Example
/// ```
/// use taskpool::SchedulerConfig;
///
/// let mut cfg = SchedulerConfig::default();
/// cfg.limit = 8;
/// assert!(cfg.validate().is_ok());
///
/// cfg.limit = 0;
/// assert!(cfg.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of tasks to run concurrently.
    pub limit: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl SchedulerConfig {
    /// Checks every field, returning the first invalid one.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        validate_limit(self.limit)?;
        if self.bus_capacity == 0 {
            return Err(SchedulerError::InvalidBusCapacity {
                capacity: self.bus_capacity,
            });
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `limit = 4`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

#[inline]
pub(crate) fn validate_limit(limit: usize) -> Result<(), SchedulerError> {
    if limit == 0 {
        Err(SchedulerError::InvalidLimit { limit })
    } else {
        Ok(())
    }
}
