#![deny(missing_docs)]

//! A bounded worker pool with coordinated shutdown.
//!
//! Jobs enter through a single shared intake and are processed by a fixed
//! number of worker threads. Every job yields exactly one result on the
//! result stream, which is closed by a dedicated supervisor only after all
//! workers have finished. Handler errors and panics are reported as failed
//! results and never take a worker down.

/// Chunked byte transfer built on the pool.
pub mod chunk;
mod config;
mod error;
mod handler;
mod job;
mod pool;
mod resequence;

pub use config::PoolConfig;
pub use error::{PoolError, Result};
pub use handler::{BoxError, Handler, HandlerResult};
pub use job::{Job, JobFailure, JobId, JobResult};
pub use pool::{Drain, Intake, WorkerPool};
pub use resequence::Resequence;
