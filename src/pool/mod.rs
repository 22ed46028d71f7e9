//! The bounded worker pool.
//!
//! A pool runs a fixed number of worker threads over one shared intake
//! queue. Each job goes to exactly one worker and yields exactly one
//! [`JobResult`]. Shutdown follows a single-owner discipline:
//!
//! * the coordinator (the owner of the [`WorkerPool`]) closes the intake;
//! * workers exit once the intake is closed and drained, and signal a
//!   completion barrier;
//! * a supervisor thread waits on that barrier and only then closes the
//!   result stream.
//!
//! Closing a queue twice, or submitting after the intake is closed, is
//! reported as an error rather than ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::channel::{self, Receiver};
use crossbeam::sync::WaitGroup;
use log::{debug, error, warn};

use crate::{Handler, Job, JobId, JobResult, PoolConfig, PoolError, Resequence, Result};

mod feeder;
mod gate;
mod shutdown;
mod worker;

use self::feeder::spawn_feeder;
use self::gate::{Gate, GateKind};
use self::shutdown::spawn_supervisor;
use self::worker::Worker;

/// A submit-only handle to a pool's intake.
///
/// Handles can be cloned and moved to producer threads. They cannot close
/// the intake; that is left to the [`WorkerPool`] owner.
pub struct Intake<T> {
    gate: Arc<Gate<Job<T>>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for Intake<T> {
    fn clone(&self) -> Self {
        Intake {
            gate: self.gate.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<T> Intake<T> {
    /// Submits a payload as a job without a sequence number.
    pub fn submit(&self, payload: T) -> Result<JobId> {
        self.submit_job(Job::new(payload))
    }

    /// Submits a job, assigning it a fresh id.
    ///
    /// Blocks while a bounded intake is full. Fails with
    /// [`PoolError::IntakeClosed`] once the intake has been closed.
    pub fn submit_job(&self, job: Job<T>) -> Result<JobId> {
        if self.gate.is_closed() {
            return Err(PoolError::IntakeClosed);
        }
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.gate.send(job.assign_id(id))?;
        Ok(id)
    }

    /// Returns `true` once the intake has been closed.
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }

    pub(crate) fn close(&self) -> Result<()> {
        self.gate.close()
    }
}

/// The coordinator's handle to a running pool.
///
/// Dropping a pool whose result stream was never taken closes its intake
/// (if still open) so the worker threads can exit. Once the stream has been
/// taken, closing the intake is the coordinator's job alone.
pub struct WorkerPool<T, R> {
    intake: Intake<T>,
    results: Option<Receiver<JobResult<R>>>,
    supervisor: Option<JoinHandle<()>>,
    workers: usize,
    thread_name: String,
}

impl<T, R> WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Starts `workers` workers over unbounded queues.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidWorkerCount`] if `workers` is 0, before
    /// any thread is started.
    pub fn start<H: Handler<T, R>>(workers: usize, handler: H) -> Result<Self> {
        Self::with_config(PoolConfig::new(workers), handler)
    }

    /// Starts a pool from a full [`PoolConfig`].
    pub fn with_config<H: Handler<T, R>>(config: PoolConfig, handler: H) -> Result<Self> {
        config.validate()?;

        let (job_tx, job_rx) = match config.intake_capacity {
            Some(cap) => channel::bounded(cap),
            None => channel::unbounded(),
        };
        let (result_tx, result_rx) = match config.result_capacity {
            Some(cap) => channel::bounded(cap),
            None => channel::unbounded(),
        };

        let intake = Intake {
            gate: Arc::new(Gate::new(GateKind::Intake, job_tx)),
            next_id: Arc::new(AtomicU64::new(0)),
        };
        let results = Gate::new(GateKind::Results, result_tx);
        let handler = Arc::new(handler);
        let done = WaitGroup::new();

        for index in 0..config.workers {
            let worker = Worker {
                index,
                jobs: job_rx.clone(),
                results: results.sender()?,
                handler: handler.clone(),
                done: done.clone(),
            };
            if let Err(e) = worker.spawn(format!("{}-worker-{index}", config.thread_name)) {
                // Let the workers already running drain out.
                intake.close()?;
                return Err(PoolError::Spawn(e));
            }
        }
        drop(job_rx);

        let supervisor_name = format!("{}-supervisor", config.thread_name);
        let supervisor = match spawn_supervisor(supervisor_name, done, results) {
            Ok(handle) => handle,
            Err(e) => {
                intake.close()?;
                return Err(PoolError::Spawn(e));
            }
        };
        debug!("Started pool with {} workers", config.workers);

        Ok(WorkerPool {
            intake,
            results: Some(result_rx),
            supervisor: Some(supervisor),
            workers: config.workers,
            thread_name: config.thread_name,
        })
    }

    /// Starts a pool fed from `jobs` and returns its result stream.
    ///
    /// A feeder thread submits every job and then closes the intake, so
    /// results can be consumed while jobs are still being produced.
    pub fn from_source<H, I>(workers: usize, jobs: I, handler: H) -> Result<Drain<R>>
    where
        H: Handler<T, R>,
        I: IntoIterator<Item = Job<T>>,
        I::IntoIter: Send + 'static,
    {
        let mut pool = Self::start(workers, handler)?;
        pool.feed(jobs.into_iter().map(Ok))?;
        pool.drain()
    }

    /// Starts a feeder thread over a fallible source. The feeder closes the
    /// intake when the source ends or fails.
    pub(crate) fn feed<I>(&self, jobs: I) -> Result<JoinHandle<Result<u64>>>
    where
        I: IntoIterator<Item = Result<Job<T>>> + Send + 'static,
    {
        let name = format!("{}-feeder", self.thread_name);
        spawn_feeder(name, self.intake(), jobs)
    }
}

impl<T, R> WorkerPool<T, R> {
    /// Submits a payload as a job without a sequence number.
    pub fn submit(&self, payload: T) -> Result<JobId> {
        self.intake.submit(payload)
    }

    /// Submits a job. See [`Intake::submit_job`].
    pub fn submit_job(&self, job: Job<T>) -> Result<JobId> {
        self.intake.submit_job(job)
    }

    /// Returns a submit-only handle for producer threads.
    pub fn intake(&self) -> Intake<T> {
        self.intake.clone()
    }

    /// Signals that no further jobs will be submitted.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::IntakeAlreadyClosed`] on a second call.
    pub fn close_intake(&self) -> Result<()> {
        self.intake.close()?;
        debug!("Intake closed");
        Ok(())
    }

    /// Number of workers the pool was started with.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Takes the pool's result stream.
    ///
    /// The stream yields results as workers produce them and ends once every
    /// worker has exited. The intake must be closed, by this handle or a
    /// feeder, for the stream to end. The pool stays usable for submitting
    /// and closing while the stream is consumed elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AlreadyDrained`] if the stream was already taken.
    pub fn drain(&mut self) -> Result<Drain<R>> {
        let results = self.results.take().ok_or(PoolError::AlreadyDrained)?;
        Ok(Drain {
            results: Some(results),
            supervisor: self.supervisor.take(),
        })
    }
}

impl<T, R> Drop for WorkerPool<T, R> {
    fn drop(&mut self) {
        if self.results.is_some() && !self.intake.is_closed() {
            warn!("Worker pool dropped with an open intake, closing it");
            if let Err(e) = self.intake.close() {
                error!("{e}");
            }
        }
    }
}

/// The result stream of a pool.
///
/// A finite, non-restartable iterator: `next` blocks until a result arrives
/// and returns `None` once the supervisor has closed the stream.
pub struct Drain<R> {
    results: Option<Receiver<JobResult<R>>>,
    supervisor: Option<JoinHandle<()>>,
}

impl<R> Drain<R> {
    /// Yields results in sequence-number order starting from 0.
    pub fn resequenced(self) -> Resequence<Self, R> {
        Resequence::new(self)
    }
}

impl<R> Iterator for Drain<R> {
    type Item = JobResult<R>;

    fn next(&mut self) -> Option<JobResult<R>> {
        let results = self.results.as_ref()?;
        match results.recv() {
            Ok(result) => Some(result),
            Err(_) => {
                self.results = None;
                if let Some(handle) = self.supervisor.take() {
                    if handle.join().is_err() {
                        error!("Pool supervisor panicked");
                    }
                }
                None
            }
        }
    }
}
