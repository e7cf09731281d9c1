//! Process lifecycle: bootstrap, listen, wait for shutdown, stop.

mod errors;
mod launch;
mod shutdown;

pub use errors::LaunchError;
pub use launch::{LaunchPlan, run_daemon, run_daemon_with};
pub use shutdown::{
    ManualShutdown, ShutdownError, ShutdownSignal, ShutdownTrigger, SystemShutdownSignal,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
