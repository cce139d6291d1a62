//! # Executors: turning a pulled task into a result.
//!
//! The scheduler hands every pulled task to an [`Executor`]. Executors are async;
//! a synchronous function is adapted with [`ExecutorFn::sync`], which wraps its
//! return value in an already-settled future so both kinds settle the same way.
//!
//! - [`DefaultExecutor`] - for [`Work`] tasks: a value is passed through, a
//!   callable is invoked and awaited.
//! - [`ExecutorFn`] - adapts a closure `Fn(T, &Control) -> Fut`.
//!
//! Failures travel as `Err(TaskError)` and reach the completion hook as its
//! `error`. A panic inside the returned future is caught by the scheduler and
//! reported as [`TaskError::Panicked`].
//!
//! ## Example
//! ```rust
//! use taskpool::{Control, ExecutorFn, TaskError};
//!
//! // Doubles every number it is given.
//! let double = ExecutorFn::new(|n: u64, _ctl: &Control| async move {
//!     Ok::<_, TaskError>(n * 2)
//! });
//!
//! // Same thing without a future.
//! let double_sync = ExecutorFn::sync(|n: u64, _ctl: &Control| Ok::<_, TaskError>(n * 2));
//! # let _ = (double, double_sync);
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;

use crate::core::Control;
use crate::error::{TaskError, panic_message};
use crate::events::{Event, EventKind};
use crate::tasks::work::Work;

/// Maps a task to its result.
///
/// Implementations may inspect or steer the scheduler through `ctl`.
#[async_trait]
pub trait Executor<T, R>: Send + Sync + 'static
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Runs one task until it settles.
    async fn execute(&self, task: T, ctl: &Control) -> Result<R, TaskError>;
}

/// Function-backed executor.
pub struct ExecutorFn<F> {
    f: F,
}

impl<F> ExecutorFn<F> {
    /// Wraps an async closure.
    pub fn new<T, R, Fut>(f: F) -> Self
    where
        F: Fn(T, &Control) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, TaskError>> + Send + 'static,
    {
        Self { f }
    }
}

impl ExecutorFn<()> {
    /// Wraps a synchronous closure; its return value becomes an already-settled future.
    pub fn sync<T, R, G>(
        g: G,
    ) -> ExecutorFn<
        impl Fn(T, &Control) -> std::future::Ready<Result<R, TaskError>> + Send + Sync + 'static,
    >
    where
        T: 'static,
        R: 'static,
        G: Fn(T, &Control) -> Result<R, TaskError> + Send + Sync + 'static,
    {
        ExecutorFn {
            f: move |task: T, ctl: &Control| std::future::ready(g(task, ctl)),
        }
    }
}

#[async_trait]
impl<T, R, F, Fut> Executor<T, R> for ExecutorFn<F>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T, &Control) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, TaskError>> + Send + 'static,
{
    async fn execute(&self, task: T, ctl: &Control) -> Result<R, TaskError> {
        (self.f)(task, ctl).await
    }
}

/// Executor used when none is configured.
///
/// - [`Work::Value`] settles immediately with `Some(value)`.
/// - [`Work::Call`] is invoked and awaited; `Ok(v)` becomes `Some(v)`, errors pass through.
/// - A panic raised while *invoking* the callable settles the task with `None`
///   and publishes [`EventKind::ExecutorPanicked`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultExecutor;

#[async_trait]
impl<V> Executor<Work<V>, Option<V>> for DefaultExecutor
where
    V: Send + Sync + 'static,
{
    async fn execute(&self, task: Work<V>, ctl: &Control) -> Result<Option<V>, TaskError> {
        match task {
            Work::Value(value) => Ok(Some(value)),
            Work::Call(job) => {
                let invoked = std::panic::catch_unwind(AssertUnwindSafe(|| job.invoke()));
                match invoked {
                    Ok(fut) => fut.await.map(Some),
                    Err(panic_err) => {
                        ctl.publish(
                            Event::new(EventKind::ExecutorPanicked)
                                .with_source(job.name())
                                .with_reason(panic_message(&*panic_err)),
                        );
                        Ok(None)
                    }
                }
            }
        }
    }
}
