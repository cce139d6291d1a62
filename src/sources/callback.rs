//! # Callback-driven task source.
//!
//! [`CallbackSource`] stores no tasks. Each pull calls a user-supplied
//! `get_task` function and returns its result verbatim; without a function it
//! reports [`Pull::Exhausted`]. This lets a scheduler drain any external producer
//! (an iterator, a channel, a remote queue).
//!
//! Installing a function through [`Scheduler::set_get_task`] resumes draining,
//! so a scheduler launched with an empty source stays idle until one is supplied.
//!
//! ## Example
//! ```rust
//! use std::sync::Mutex;
//! use taskpool::{CallbackSource, Control, Pull, Scheduler, Work};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), taskpool::SchedulerError> {
//! let sched = Scheduler::builder(CallbackSource::<Work<u32>>::empty()).build()?;
//! sched.launch();
//!
//! let numbers = Mutex::new((0..3u32).map(Work::value));
//! sched.set_get_task(move |_ctl: &Control| -> Pull<Work<u32>> {
//!     numbers.lock().unwrap().next().into()
//! });
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::core::{Control, Scheduler};
use crate::sources::source::{Pull, TaskSource};

/// Boxed `get_task` function.
pub type GetTask<T> = Arc<dyn Fn(&Control) -> BoxFuture<'static, Pull<T>> + Send + Sync>;

fn boxed_sync<T, F>(f: F) -> GetTask<T>
where
    T: Send + 'static,
    F: Fn(&Control) -> Pull<T> + Send + Sync + 'static,
{
    Arc::new(move |ctl: &Control| -> BoxFuture<'static, Pull<T>> {
        Box::pin(std::future::ready(f(ctl)))
    })
}

fn boxed_async<T, F, Fut>(f: F) -> GetTask<T>
where
    F: Fn(&Control) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Pull<T>> + Send + 'static,
{
    Arc::new(move |ctl: &Control| -> BoxFuture<'static, Pull<T>> { Box::pin(f(ctl)) })
}

/// Task source that delegates every pull to a function.
pub struct CallbackSource<T> {
    get_task: RwLock<Option<GetTask<T>>>,
}

impl<T> CallbackSource<T> {
    /// Creates a source with no function; it stays exhausted until one is set.
    pub fn empty() -> Self {
        Self {
            get_task: RwLock::new(None),
        }
    }

    /// Creates a source from a synchronous function.
    pub fn from_fn<F>(f: F) -> Self
    where
        T: Send + 'static,
        F: Fn(&Control) -> Pull<T> + Send + Sync + 'static,
    {
        Self {
            get_task: RwLock::new(Some(boxed_sync(f))),
        }
    }

    /// Creates a source from a future-returning function.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(&Control) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Pull<T>> + Send + 'static,
    {
        Self {
            get_task: RwLock::new(Some(boxed_async(f))),
        }
    }

    /// Returns the current function, if any.
    pub fn get_task(&self) -> Option<GetTask<T>> {
        self.get_task
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs or clears the function. Does not resume a scheduler.
    pub(crate) fn replace(&self, get_task: Option<GetTask<T>>) {
        *self
            .get_task
            .write()
            .unwrap_or_else(PoisonError::into_inner) = get_task;
    }
}

impl<T> Default for CallbackSource<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for CallbackSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSource")
            .field("has_get_task", &self.get_task().is_some())
            .finish()
    }
}

#[async_trait]
impl<T> TaskSource for CallbackSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Task = T;

    async fn pull(&self, ctl: &Control) -> Pull<T> {
        // the lock is not held across the call
        match self.get_task() {
            Some(get_task) => get_task(ctl).await,
            None => Pull::Exhausted,
        }
    }
}

/// Callback operations that resume draining.
impl<T, R> Scheduler<CallbackSource<T>, R>
where
    T: Clone + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Installs a synchronous `get_task` function, then attempts to resume draining.
    pub fn set_get_task<F>(&self, f: F)
    where
        F: Fn(&Control) -> Pull<T> + Send + Sync + 'static,
    {
        self.source().replace(Some(boxed_sync(f)));
        self.start();
    }

    /// Installs a future-returning `get_task` function, then attempts to resume draining.
    pub fn set_get_task_async<F, Fut>(&self, f: F)
    where
        F: Fn(&Control) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Pull<T>> + Send + 'static,
    {
        self.source().replace(Some(boxed_async(f)));
        self.start();
    }

    /// Removes the function; subsequent pulls report exhaustion.
    pub fn clear_get_task(&self) {
        self.source().replace(None);
    }

    pub fn has_get_task(&self) -> bool {
        self.source().get_task().is_some()
    }
}
