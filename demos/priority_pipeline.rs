//! # Example: priority_pipeline
//!
//! Drains a priority queue of fetch jobs through three slots while logging
//! every scheduler event with `tracing`.
//!
//! Shows how to:
//! - Order pending work with a comparator (lower priority number first).
//! - Attach [`LogWriter`] as a subscriber.
//! - Feed more work from the exhaustion hook, then stop.
//!
//! ## Flow
//! ```text
//! OrderedQueue(comparator) ──► Scheduler (limit 3)
//!     ├─► run_task ──► on_completed  (collect results)
//!     ├─► SourceExhausted ──► on_exhausted (refill once, then stop)
//!     └─► events ──► LogWriter ──► tracing_subscriber::fmt
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example priority_pipeline --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use taskpool::{
    Control, DefaultExecutor, Executor, ExecutorFn, LogWriter, OrderedQueue, Scheduler, Subscribe,
    TaskError, Work,
};
use tokio::sync::mpsc;

/// Simulated fetch that takes `ms` and fails for odd ids.
fn fetch(id: u32, priority: u8, ms: u64) -> (u8, Work<String>) {
    let job = Work::call(format!("fetch-{id}"), move || async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        if id % 2 == 1 {
            return Err(TaskError::fail(format!("upstream rejected {id}")));
        }
        Ok(format!("payload-{id}"))
    });
    (priority, job)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let (tx, mut rx) = mpsc::unbounded_channel();
    let refilled = AtomicBool::new(false);

    let queue = OrderedQueue::new()
        .with_comparator(|a: &(u8, Work<String>), b: &(u8, Work<String>)| a.0.cmp(&b.0))
        .with_tasks([fetch(1, 2, 120), fetch(2, 0, 80), fetch(3, 1, 40), fetch(4, 0, 60)]);

    let sched = Scheduler::builder_with(
        queue,
        ExecutorFn::new(|(_, job): (u8, Work<String>), ctl: &Control| {
            let ctl = ctl.clone();
            async move {
                DefaultExecutor
                    .execute(job, &ctl)
                    .await
                    .map(Option::unwrap_or_default)
            }
        }),
    )
    .with_limit(3)
    .with_subscribers(subs)
    .on_completed(move |done, _sched| {
        let _ = tx.send((done.task.1.name().unwrap_or_default().to_string(), done.outcome));
    })
    .on_exhausted(move |sched| {
        if !refilled.swap(true, Ordering::SeqCst) {
            sched.add([fetch(5, 0, 30), fetch(6, 3, 10)]);
        } else {
            sched.stop();
        }
    })
    .build()?;

    sched.launch();

    for _ in 0..6 {
        if let Some((name, outcome)) = rx.recv().await {
            match outcome {
                Ok(body) => println!("[{name}] ok: {body}"),
                Err(err) => println!("[{name}] {}: {}", err.as_label(), err.as_message()),
            }
        }
    }
    sched.wait_idle().await;
    Ok(())
}
