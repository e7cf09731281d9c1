//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, Services, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub struct LaunchPlan<L, S> {
    /// Configuration source.
    pub loader: L,
    /// Blocks until the daemon should stop.
    pub shutdown: S,
    /// Reporter, upstream state and handler overrides.
    pub services: Services,
}

/// Runs the daemon using the production collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, listener binding or signal
/// installation fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        shutdown: SystemShutdownSignal::new(),
        services: Services::new(reporter),
    })
}

/// Runs the daemon with injected collaborators.
///
/// Blocks until `plan.shutdown` releases, then stops accepting connections and
/// joins the accept thread.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, listener binding or the shutdown
/// wait fails.
pub fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        shutdown,
        services,
    } = plan;

    info!(target: PROCESS_TARGET, "starting daemon runtime");
    let daemon = bootstrap_with(&loader, services)?;
    let listener = SocketListener::bind(daemon.config().listen())?;
    let listener_handle = listener.start(daemon.connection_handler())?;
    daemon.reporter().listener_started(daemon.config().listen());

    let waited = shutdown.wait();
    listener_handle.shutdown();
    listener_handle.join()?;
    waited?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
