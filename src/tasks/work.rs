//! # Ready-made task type: plain value or named callable.
//!
//! [`Work`] covers the two shapes an application usually schedules:
//! - [`Work::Value`] - data that the default executor passes through as the result;
//! - [`Work::Call`] - a [`Job`] wrapping a closure `Fn() -> Fut`, producing a fresh
//!   future per invocation.
//!
//! ## Equality
//! Queue membership (`remove`/`has`) needs equality. Values compare by value;
//! jobs compare by identity (two clones of the same `Job` are equal, two jobs
//! built from identical closures are not).
//!
//! ## Example
//! ```rust
//! use taskpool::{TaskError, Work};
//!
//! let job = Work::call("fetch", || async { Ok::<_, TaskError>(42u32) });
//! let same = job.clone();
//! assert_eq!(job, same);
//! assert_eq!(job.name(), Some("fetch"));
//!
//! let value = Work::value(7u32);
//! assert_ne!(job, value);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::TaskError;

type JobFn<V> = dyn Fn() -> BoxFuture<'static, Result<V, TaskError>> + Send + Sync;

/// Named, shareable callable producing a new future per invocation.
pub struct Job<V> {
    name: Cow<'static, str>,
    f: Arc<JobFn<V>>,
}

impl<V> Job<V> {
    /// Creates a job from an async closure.
    pub fn new<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, TaskError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(move || -> BoxFuture<'static, Result<V, TaskError>> { Box::pin(f()) }),
        }
    }

    /// Returns the job name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the closure, returning the future it produced.
    ///
    /// Panics raised by the closure itself (before a future exists) propagate.
    pub fn invoke(&self) -> BoxFuture<'static, Result<V, TaskError>> {
        (self.f)()
    }
}

impl<V> Clone for Job<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            f: Arc::clone(&self.f),
        }
    }
}

impl<V> PartialEq for Job<V> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl<V> fmt::Debug for Job<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("name", &self.name).finish()
    }
}

/// A schedulable unit: either data or a callable.
#[derive(Clone, Debug)]
pub enum Work<V> {
    /// Plain value, used as its own result by the default executor.
    Value(V),
    /// Callable invoked by the default executor.
    Call(Job<V>),
}

impl<V> Work<V> {
    /// Wraps a plain value.
    pub fn value(value: V) -> Self {
        Work::Value(value)
    }

    /// Wraps an async closure.
    pub fn call<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, TaskError>> + Send + 'static,
    {
        Work::Call(Job::new(name, f))
    }

    /// Wraps a synchronous closure; its return value becomes an already-settled future.
    pub fn call_sync<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Send + 'static,
    {
        Work::Call(Job::new(name, move || std::future::ready(Ok(f()))))
    }

    /// Returns the job name for callables.
    pub fn name(&self) -> Option<&str> {
        match self {
            Work::Value(_) => None,
            Work::Call(job) => Some(job.name()),
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Work::Call(_))
    }

    /// Returns the wrapped value for [`Work::Value`].
    pub fn as_value(&self) -> Option<&V> {
        match self {
            Work::Value(v) => Some(v),
            Work::Call(_) => None,
        }
    }
}

impl<V: PartialEq> PartialEq for Work<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Work::Value(a), Work::Value(b)) => a == b,
            (Work::Call(a), Work::Call(b)) => a == b,
            _ => false,
        }
    }
}

impl<V> From<V> for Work<V> {
    fn from(value: V) -> Self {
        Work::Value(value)
    }
}
