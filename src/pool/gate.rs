use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam::channel::Sender;

use crate::{PoolError, Result};

/// Which queue a gate guards, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateKind {
    Intake,
    Results,
}

/// Owns the master sender of a channel and closes it at most once.
///
/// Anyone sending through the gate gets a clone of the master sender. The
/// channel disconnects once `close` has dropped the master and every clone
/// handed out has been dropped too.
pub(crate) struct Gate<M> {
    kind: GateKind,
    tx: Mutex<Option<Sender<M>>>,
}

impl<M> Gate<M> {
    pub(crate) fn new(kind: GateKind, tx: Sender<M>) -> Self {
        Gate {
            kind,
            tx: Mutex::new(Some(tx)),
        }
    }

    /// Returns a sender clone, or the matching error if already closed.
    pub(crate) fn sender(&self) -> Result<Sender<M>> {
        self.lock().clone().ok_or_else(|| self.closed_error())
    }

    /// Sends `msg`, blocking while a bounded channel is full.
    ///
    /// The lock is not held across the send, so a full queue never blocks
    /// `close` or other senders.
    pub(crate) fn send(&self, msg: M) -> Result<()> {
        let tx = self.sender()?;
        tx.send(msg).map_err(|_| self.closed_error())
    }

    /// Drops the master sender. A second call is a protocol violation.
    pub(crate) fn close(&self) -> Result<()> {
        match self.lock().take() {
            Some(_) => Ok(()),
            None => Err(match self.kind {
                GateKind::Intake => PoolError::IntakeAlreadyClosed,
                GateKind::Results => PoolError::ResultStreamAlreadyClosed,
            }),
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    fn closed_error(&self) -> PoolError {
        match self.kind {
            GateKind::Intake => PoolError::IntakeClosed,
            GateKind::Results => PoolError::ResultStreamAlreadyClosed,
        }
    }

    // Nothing panics while the lock is held, but a poisoned gate is still usable.
    fn lock(&self) -> MutexGuard<'_, Option<Sender<M>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
