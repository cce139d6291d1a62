//! # Task types and executors.
//!
//! This module provides:
//! - [`Work`] / [`Job`] - ready-made task type (plain value or named callable)
//! - [`Executor`] - trait mapping a task to its result
//! - [`ExecutorFn`] - closure-backed executor (async or sync)
//! - [`DefaultExecutor`] - pass-through for values, invoke-and-await for callables

mod executor;
mod work;

pub use executor::{DefaultExecutor, Executor, ExecutorFn};
pub use work::{Job, Work};
