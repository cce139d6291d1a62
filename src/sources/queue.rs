//! # Ordered in-memory queue source.
//!
//! [`OrderedQueue`] serves tasks from the head of an owned sequence. With a
//! comparator configured, the sequence is stable-sorted right after every add,
//! which turns the queue into a priority queue (ties keep insertion order).
//!
//! ## Rules
//! - `pull` pops the head; it reports [`Pull::Exhausted`] exactly when the
//!   queue was empty before the pull.
//! - `remove` drops the first equal task and does not re-sort.
//! - Adding through the scheduler ([`Scheduler::add`]) resumes draining. This
//!   also holds for a queue shared as `Arc<OrderedQueue<T>>` (see [`QueueSource`]);
//!   adding to the queue directly does not.
//!
//! ## Example
//! ```rust
//! use taskpool::{OrderedQueue, Scheduler, Work};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), taskpool::SchedulerError> {
//! // Higher numbers first.
//! let queue = OrderedQueue::new()
//!     .with_comparator(|a: &Work<u32>, b: &Work<u32>| b.as_value().cmp(&a.as_value()));
//!
//! let sched = Scheduler::builder(queue).with_limit(2).build()?;
//! sched.add([Work::value(1), Work::value(3), Work::value(2)]);
//! assert!(sched.has(&Work::value(3)));
//! assert_eq!(sched.source().snapshot(), vec![Work::value(3), Work::value(2), Work::value(1)]);
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::core::{Control, Scheduler};
use crate::sources::source::{Pull, TaskSource};

/// Total-order function used to keep the queue sorted.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

struct QueueState<T> {
    tasks: VecDeque<T>,
    comparator: Option<Comparator<T>>,
}

impl<T> QueueState<T> {
    fn sort(&mut self) {
        if let Some(cmp) = &self.comparator {
            // slice::sort_by is stable
            self.tasks.make_contiguous().sort_by(|a, b| cmp(a, b));
        }
    }
}

/// Task source backed by an in-memory ordered sequence.
pub struct OrderedQueue<T> {
    state: Mutex<QueueState<T>>,
}

impl<T> OrderedQueue<T> {
    /// Creates an empty FIFO queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                comparator: None,
            }),
        }
    }

    /// Seeds the queue with initial tasks (sorted if a comparator is set).
    pub fn with_tasks<I>(self, tasks: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.extend(tasks);
        self
    }

    /// Sets the comparator and sorts the queue with it.
    pub fn with_comparator<F>(self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.set_comparator(Some(Arc::new(cmp)));
        self
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends tasks and re-sorts. Does not resume a scheduler.
    pub(crate) fn extend<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut st = self.lock();
        st.tasks.extend(tasks);
        st.sort();
    }

    /// Swaps the whole sequence and re-sorts. Does not resume a scheduler.
    pub(crate) fn replace<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut st = self.lock();
        st.tasks = tasks.into_iter().collect();
        st.sort();
    }

    /// Replaces the comparator; a new comparator re-sorts immediately.
    pub fn set_comparator(&self, cmp: Option<Comparator<T>>) {
        let mut st = self.lock();
        st.comparator = cmp;
        st.sort();
    }

    /// Removes the first task equal to `task`.
    pub fn remove(&self, task: &T) -> bool
    where
        T: PartialEq,
    {
        let mut st = self.lock();
        match st.tasks.iter().position(|t| t == task) {
            Some(index) => {
                st.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has(&self, task: &T) -> bool
    where
        T: PartialEq,
    {
        self.lock().tasks.contains(task)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tasks.is_empty()
    }

    /// Drops every pending task.
    pub fn clear(&self) {
        self.lock().tasks.clear();
    }

    /// Clones the pending tasks in serving order.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().tasks.iter().cloned().collect()
    }

    fn pop(&self) -> Pull<T> {
        self.lock().tasks.pop_front().into()
    }
}

impl<T> Default for OrderedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OrderedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.lock();
        f.debug_struct("OrderedQueue")
            .field("len", &st.tasks.len())
            .field("sorted", &st.comparator.is_some())
            .finish()
    }
}

#[async_trait]
impl<T> TaskSource for OrderedQueue<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Task = T;

    async fn pull(&self, _ctl: &Control) -> Pull<T> {
        self.pop()
    }
}

/// A source that serves tasks from an [`OrderedQueue`], owned or shared.
///
/// Schedulers over any `QueueSource` gain the queue methods below, so a queue
/// kept behind an `Arc` by a producer still resumes draining on `add`.
pub trait QueueSource: TaskSource {
    /// Element type of the underlying queue.
    type Item: Clone + Send + Sync + 'static;

    /// Returns the underlying queue.
    fn queue(&self) -> &OrderedQueue<Self::Item>;
}

impl<T> QueueSource for OrderedQueue<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn queue(&self) -> &OrderedQueue<T> {
        self
    }
}

impl<T> QueueSource for Arc<OrderedQueue<T>>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn queue(&self) -> &OrderedQueue<T> {
        self
    }
}

/// Queue operations; the adding ones resume draining.
impl<Q, R> Scheduler<Q, R>
where
    Q: QueueSource,
    R: Send + 'static,
{
    /// Appends tasks, re-sorts, then attempts to resume draining.
    pub fn add<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = Q::Item>,
    {
        self.source().queue().extend(tasks);
        self.start();
    }

    /// Appends a single task, re-sorts, then attempts to resume draining.
    pub fn push(&self, task: Q::Item) {
        self.add(std::iter::once(task));
    }

    /// Replaces every pending task, re-sorts, then attempts to resume draining.
    pub fn replace_tasks<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = Q::Item>,
    {
        self.source().queue().replace(tasks);
        self.start();
    }

    /// Removes the first pending task equal to `task`.
    pub fn remove(&self, task: &Q::Item) -> bool
    where
        Q::Item: PartialEq,
    {
        self.source().queue().remove(task)
    }

    /// Checks whether an equal task is still pending.
    pub fn has(&self, task: &Q::Item) -> bool
    where
        Q::Item: PartialEq,
    {
        self.source().queue().has(task)
    }

    /// Number of tasks waiting to be pulled.
    pub fn pending(&self) -> usize {
        self.source().queue().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::control::Drain;
    use std::sync::Weak;

    struct NoDrain;

    impl Drain for NoDrain {
        fn spawn_drain(self: Arc<Self>) {}
    }

    fn control() -> Control {
        let weak: Weak<dyn Drain> = Weak::<NoDrain>::new();
        Control::new(1, 8, weak)
    }

    #[tokio::test]
    async fn test_fifo_without_comparator() {
        let ctl = control();
        let q = OrderedQueue::new().with_tasks([3, 1, 2]);
        assert_eq!(q.pull(&ctl).await, Pull::Ready(3));
        assert_eq!(q.pull(&ctl).await, Pull::Ready(1));
        assert_eq!(q.pull(&ctl).await, Pull::Ready(2));
        assert_eq!(q.pull(&ctl).await, Pull::Exhausted);
    }

    #[tokio::test]
    async fn test_exhausted_only_when_empty_before_pull() {
        let ctl = control();
        let q = OrderedQueue::new().with_tasks([1]);
        // the last task is served, not reported as exhausted
        assert_eq!(q.pull(&ctl).await, Pull::Ready(1));
        assert_eq!(q.pull(&ctl).await, Pull::Exhausted);

        q.extend([2]);
        assert_eq!(q.pull(&ctl).await, Pull::Ready(2));
    }

    #[test]
    fn test_comparator_sorts_after_every_add() {
        let q = OrderedQueue::new().with_comparator(|a: &u32, b: &u32| a.cmp(b));
        q.extend([5, 1, 3]);
        assert_eq!(q.snapshot(), vec![1, 3, 5]);
        q.extend([2, 4]);
        assert_eq!(q.snapshot(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sort_is_stable() {
        let q = OrderedQueue::new()
            .with_comparator(|a: &(u8, char), b: &(u8, char)| a.0.cmp(&b.0))
            .with_tasks([(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')]);
        assert_eq!(q.snapshot(), vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_set_comparator_resorts_immediately() {
        let q = OrderedQueue::new().with_tasks([2, 3, 1]);
        q.set_comparator(Some(Arc::new(|a: &i32, b: &i32| b.cmp(a))));
        assert_eq!(q.snapshot(), vec![3, 2, 1]);

        q.set_comparator(None);
        q.extend([5]);
        assert_eq!(q.snapshot(), vec![3, 2, 1, 5]);
    }

    #[test]
    fn test_remove_first_match_only() {
        let q = OrderedQueue::new().with_tasks(["a", "b", "a"]);
        assert!(q.remove(&"a"));
        assert_eq!(q.snapshot(), vec!["b", "a"]);
        assert!(!q.remove(&"z"));
        assert!(q.has(&"a"));
        assert!(!q.has(&"z"));
    }

    #[test]
    fn test_replace_and_clear() {
        let q = OrderedQueue::new()
            .with_comparator(|a: &u8, b: &u8| a.cmp(b))
            .with_tasks([9, 8]);
        q.replace([3, 2, 1]);
        assert_eq!(q.snapshot(), vec![1, 2, 3]);
        assert_eq!(q.len(), 3);

        q.clear();
        assert!(q.is_empty());
    }
}
