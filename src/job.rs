use std::fmt;

use thiserror::Error;

/// Identity assigned to a job when it enters a pool.
///
/// Ids are unique within one pool and increase in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub(crate) u64);

impl JobId {
    /// Returns the raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// A unit of work: an opaque payload plus an optional sequence number.
///
/// A job cannot be changed once built. The sequence number is only needed
/// when the consumer wants to restore submission order, see
/// [`Resequence`](crate::Resequence).
#[derive(Debug, Clone)]
pub struct Job<T> {
    id: JobId,
    seq: Option<u64>,
    payload: T,
}

impl<T> Job<T> {
    /// Creates a job without a sequence number.
    pub fn new(payload: T) -> Self {
        Job {
            id: JobId(0),
            seq: None,
            payload,
        }
    }

    /// Creates a job carrying a sequence number.
    pub fn with_seq(seq: u64, payload: T) -> Self {
        Job {
            id: JobId(0),
            seq: Some(seq),
            payload,
        }
    }

    /// The id assigned by the pool on submission.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// The sequence number, if any.
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Borrows the payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes the job, returning its payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    pub(crate) fn assign_id(mut self, id: JobId) -> Self {
        self.id = id;
        self
    }
}

/// Why a job produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobFailure {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Handler(String),

    /// The handler panicked; holds the panic message.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl JobFailure {
    /// The diagnostic text, never empty.
    pub fn message(&self) -> &str {
        match self {
            JobFailure::Handler(msg) | JobFailure::Panicked(msg) => msg,
        }
    }
}

/// The outcome of processing exactly one [`Job`].
#[derive(Debug, Clone)]
pub struct JobResult<R> {
    id: JobId,
    seq: Option<u64>,
    worker: usize,
    outcome: std::result::Result<R, JobFailure>,
}

impl<R> JobResult<R> {
    pub(crate) fn new(
        id: JobId,
        seq: Option<u64>,
        worker: usize,
        outcome: std::result::Result<R, JobFailure>,
    ) -> Self {
        JobResult {
            id,
            seq,
            worker,
            outcome,
        }
    }

    /// Id of the originating job.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Sequence number of the originating job.
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Index of the worker that ran the job.
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Returns `true` if the handler produced a value.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Borrows the outcome.
    pub fn outcome(&self) -> std::result::Result<&R, &JobFailure> {
        self.outcome.as_ref()
    }

    /// Consumes the result, returning its outcome.
    pub fn into_outcome(self) -> std::result::Result<R, JobFailure> {
        self.outcome
    }
}
