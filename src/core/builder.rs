use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;

use super::{
    config::SchedulerConfig,
    control::{Control, Drain},
    runner::Completion,
    scheduler::{CompletedHook, ExhaustedHook, Inner, Scheduler},
};
use crate::{
    error::SchedulerError,
    sources::TaskSource,
    subscribers::{Fanout, Subscribe},
    tasks::Executor,
};

/// Builder for constructing a [`Scheduler`] with optional hooks and subscribers.
pub struct SchedulerBuilder<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    cfg: SchedulerConfig,
    source: S,
    executor: Arc<dyn Executor<S::Task, R>>,
    completed: Option<CompletedHook<S, R>>,
    exhausted: Option<ExhaustedHook<S, R>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<S, R> SchedulerBuilder<S, R>
where
    S: TaskSource,
    R: Send + 'static,
{
    pub(crate) fn new(source: S, executor: Arc<dyn Executor<S::Task, R>>) -> Self {
        Self {
            cfg: SchedulerConfig::default(),
            source,
            executor,
            completed: None,
            exhausted: None,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: SchedulerConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the initial concurrency limit (validated in [`build`](Self::build)).
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.cfg.limit = limit;
        self
    }

    /// Replaces the executor.
    pub fn with_executor<E>(mut self, executor: E) -> Self
    where
        E: Executor<S::Task, R>,
    {
        self.executor = Arc::new(executor);
        self
    }

    /// Sets the hook invoked once per dispatched task after it settles.
    ///
    /// The slot is already released when the hook runs. A panic inside the
    /// hook is reported as `HookPanicked` and otherwise ignored.
    pub fn on_completed<F>(mut self, hook: F) -> Self
    where
        F: Fn(Completion<S::Task, R>, &Scheduler<S, R>) + Send + Sync + 'static,
    {
        self.completed = Some(Arc::new(hook));
        self
    }

    /// Sets the hook invoked each time the source reports exhaustion.
    ///
    /// The scheduler is already paused when the hook runs; adding tasks from
    /// inside the hook resumes it.
    pub fn on_exhausted<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Scheduler<S, R>) + Send + Sync + 'static,
    {
        self.exhausted = Some(Arc::new(hook));
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive scheduler events through dedicated workers with
    /// bounded queues. A non-empty list requires a tokio runtime at `build()`.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and assembles the scheduler.
    ///
    /// The scheduler is returned not launched; call
    /// [`Scheduler::launch`] to start draining.
    pub fn build(self) -> Result<Scheduler<S, R>, SchedulerError> {
        self.cfg.validate()?;

        let limit = self.cfg.limit;
        let capacity = self.cfg.bus_capacity;
        let listener = (!self.subscribers.is_empty()).then(CancellationToken::new);
        let inner = Arc::new_cyclic(|weak: &Weak<Inner<S, R>>| {
            let driver: Weak<dyn Drain> = weak.clone();
            Inner {
                control: Control::new(limit, capacity, driver),
                source: self.source,
                executor: self.executor,
                completed: self.completed,
                exhausted: self.exhausted,
                listener: listener.clone(),
            }
        });

        if let Some(token) = listener {
            Fanout::new(self.subscribers, inner.control.clone()).listen(token);
        }
        Ok(Scheduler { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::OrderedQueue;
    use crate::tasks::Work;

    #[test]
    fn test_build_rejects_zero_limit() {
        let res = Scheduler::builder(OrderedQueue::<Work<u8>>::new())
            .with_limit(0)
            .build();
        assert!(matches!(res, Err(SchedulerError::InvalidLimit { limit: 0 })));
    }

    #[test]
    fn test_build_rejects_zero_bus_capacity() {
        let cfg = SchedulerConfig {
            bus_capacity: 0,
            ..SchedulerConfig::default()
        };
        let res = Scheduler::builder(OrderedQueue::<Work<u8>>::new())
            .with_config(cfg)
            .build();
        assert!(matches!(
            res,
            Err(SchedulerError::InvalidBusCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_built_scheduler_is_not_launched() {
        let sched = Scheduler::builder(OrderedQueue::<Work<u8>>::new())
            .with_limit(3)
            .build()
            .expect("valid config");
        assert!(!sched.is_launched());
        assert!(sched.is_paused());
        assert_eq!(sched.limit(), 3);
        assert_eq!(sched.running(), 0);
        assert!(!sched.can_continue());
    }
}
