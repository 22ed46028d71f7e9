use std::io;
use thiserror::Error;

/// Error type for pool operations.
///
/// Only configuration errors and protocol violations live here. A job that
/// fails or panics is reported through its [`JobResult`](crate::JobResult)
/// instead.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The pool was asked to run with zero workers.
    #[error("Invalid worker count {0}: a pool needs at least one worker")]
    InvalidWorkerCount(usize),

    /// Chunked transfers need a non-zero chunk size.
    #[error("Invalid chunk size 0")]
    InvalidChunkSize,

    /// A worker or supervisor thread could not be started.
    #[error("Failed to spawn pool thread: {0}")]
    Spawn(#[source] io::Error),

    /// Malformed pool configuration document.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// A job was submitted after the intake was closed.
    #[error("Intake is closed, job rejected")]
    IntakeClosed,

    /// The intake was closed more than once.
    #[error("Intake was already closed")]
    IntakeAlreadyClosed,

    /// The result stream was closed more than once.
    #[error("Result stream was already closed")]
    ResultStreamAlreadyClosed,

    /// The result stream was taken more than once.
    #[error("Result stream was already taken")]
    AlreadyDrained,

    /// IO error from a byte-stream collaborator.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
