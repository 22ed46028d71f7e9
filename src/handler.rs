use std::error::Error;

use crate::Job;

/// Boxed error a handler may return.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Return type of [`Handler::handle`].
pub type HandlerResult<R> = std::result::Result<R, BoxError>;

/// Processes jobs on behalf of a pool.
///
/// One handler instance is shared by every worker, so `handle` may run on
/// several threads at once. State the handler mutates must be protected by
/// the handler itself; the pool does not serialize calls.
///
/// Closures of the form `Fn(Job<T>) -> HandlerResult<R>` implement this
/// trait.
pub trait Handler<T, R>: Send + Sync + 'static {
    /// Processes one job.
    ///
    /// An `Err` is reported as a failed result and the worker moves on.
    fn handle(&self, job: Job<T>) -> HandlerResult<R>;
}

impl<T, R, F> Handler<T, R> for F
where
    F: Fn(Job<T>) -> HandlerResult<R> + Send + Sync + 'static,
{
    fn handle(&self, job: Job<T>) -> HandlerResult<R> {
        self(job)
    }
}
