//! Shutdown notification for the daemon runtime.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification mechanism cannot be
    /// installed.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Installing signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that waits for termination signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl SystemShutdownSignal {
    /// Builds a signal listener.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = Signals::new([SIGTERM, SIGINT, SIGQUIT, SIGHUP])
            .map_err(|source| ShutdownError::Install { source })?;
        if let Some(signal) = signals.forever().next() {
            info!(
                target: PROCESS_TARGET,
                signal,
                "shutdown signal received"
            );
        }
        Ok(())
    }
}

/// Shutdown triggered programmatically, e.g. by an embedding host or a test.
#[derive(Debug)]
pub struct ManualShutdown {
    receiver: Mutex<Receiver<()>>,
}

/// Sending half of a [`ManualShutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    sender: Sender<()>,
}

impl ManualShutdown {
    /// Creates the waiting half and the trigger that releases it.
    #[must_use]
    pub fn new() -> (Self, ShutdownTrigger) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                receiver: Mutex::new(receiver),
            },
            ShutdownTrigger { sender },
        )
    }
}

impl ShutdownTrigger {
    /// Releases the waiting daemon. Triggering twice is harmless.
    pub fn trigger(&self) {
        // The receiver is gone once the daemon has already stopped.
        let _ = self.sender.send(());
    }
}

impl ShutdownSignal for ManualShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        let receiver = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
        // A dropped trigger also releases the wait.
        let _ = receiver.recv();
        info!(target: PROCESS_TARGET, "shutdown requested");
        Ok(())
    }
}
