use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{Receiver, Sender};
use crossbeam::sync::WaitGroup;
use log::{debug, warn};

use crate::{Handler, Job, JobFailure, JobResult};

/// One worker slot of a pool.
///
/// A worker reads jobs until the intake is closed and drained. It never
/// closes a queue: on exit it drops its own result sender and then its
/// completion token, in that order.
pub(crate) struct Worker<T, R, H> {
    pub(crate) index: usize,
    pub(crate) jobs: Receiver<Job<T>>,
    pub(crate) results: Sender<JobResult<R>>,
    pub(crate) handler: Arc<H>,
    pub(crate) done: WaitGroup,
}

impl<T, R, H> Worker<T, R, H>
where
    T: Send + 'static,
    R: Send + 'static,
    H: Handler<T, R>,
{
    /// Starts the worker on a named thread.
    pub(crate) fn spawn(self, name: String) -> io::Result<JoinHandle<()>> {
        thread::Builder::new().name(name).spawn(move || self.run())
    }

    fn run(self) {
        let Worker {
            index,
            jobs,
            results,
            handler,
            done,
        } = self;
        debug!("Worker {index} started");

        let mut consumer_gone = false;
        for job in jobs.iter() {
            let result = execute(index, handler.as_ref(), job);
            if let Err(failure) = result.outcome() {
                warn!("Worker {index}: {} failed: {}", result.id(), failure);
            }
            if consumer_gone {
                continue;
            }
            if results.send(result).is_err() {
                warn!("Worker {index}: result stream dropped by consumer, discarding results");
                consumer_gone = true;
            }
        }

        drop(results);
        debug!("Worker {index}: intake closed, shutting down");
        drop(done);
    }
}

/// Runs the handler on one job, turning errors and panics into a failed result.
pub(crate) fn execute<T, R, H>(index: usize, handler: &H, job: Job<T>) -> JobResult<R>
where
    H: Handler<T, R>,
{
    let id = job.id();
    let seq = job.seq();
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(job))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let msg = e.to_string();
            if msg.is_empty() {
                Err(JobFailure::Handler("handler returned an error without a message".to_owned()))
            } else {
                Err(JobFailure::Handler(msg))
            }
        }
        Err(payload) => Err(JobFailure::Panicked(panic_message(payload))),
    };
    JobResult::new(id, seq, index, outcome)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let msg = match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_owned(),
            Err(_) => return "panic with a non-string payload".to_owned(),
        },
    };
    if msg.is_empty() {
        "panic with an empty message".to_owned()
    } else {
        msg
    }
}
