use std::io;
use std::thread::{self, JoinHandle};

use crossbeam::sync::WaitGroup;
use log::{debug, error};

use super::gate::Gate;

/// Starts the task that closes the result stream.
///
/// It blocks until every worker has dropped its completion token and is the
/// only code that ever closes `results`.
pub(crate) fn spawn_supervisor<M: Send + 'static>(
    name: String,
    done: WaitGroup,
    results: Gate<M>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(name)
        .spawn(move || {
            done.wait();
            match results.close() {
                Ok(()) => debug!("All workers finished, result stream closed"),
                Err(e) => error!("Supervisor: {e}"),
            }
        })
}
