use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::Intake;
use crate::{Job, PoolError, Result};

/// Starts a producer thread that submits every job from `jobs` and then
/// closes the intake on behalf of the coordinator.
///
/// The intake is closed even when the source fails part way, so the pool
/// still shuts down. The handle yields the number of jobs submitted.
pub(crate) fn spawn_feeder<T, I>(
    name: String,
    intake: Intake<T>,
    jobs: I,
) -> Result<JoinHandle<Result<u64>>>
where
    T: Send + 'static,
    I: IntoIterator<Item = Result<Job<T>>> + Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(move || {
            let fed = feed(&intake, jobs);
            if let Err(e) = intake.close() {
                error!("Feeder: {e}");
            }
            match &fed {
                Ok(count) => debug!("Feeder submitted {count} jobs, intake closed"),
                Err(e) => error!("Feeder stopped early: {e}"),
            }
            fed
        })
        .map_err(PoolError::Spawn)
}

fn feed<T, I>(intake: &Intake<T>, jobs: I) -> Result<u64>
where
    I: IntoIterator<Item = Result<Job<T>>>,
{
    let mut count = 0;
    for job in jobs {
        intake.submit_job(job?)?;
        count += 1;
    }
    Ok(count)
}
