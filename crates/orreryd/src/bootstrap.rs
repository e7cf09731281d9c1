//! Daemon bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use orrery_config::{Config, SocketPreparationError};
use orrery_protocol::MethodHandler;

use crate::dispatch::{DispatchConnectionHandler, Dispatcher};
use crate::handlers::default_handlers;
use crate::health::HealthReporter;
use crate::registry::{HandlerRegistry, RegistryError};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::upstream::{SharedSnapshot, SnapshotError, SnapshotFile, SnapshotSource};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when any configuration layer is invalid.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a pre-resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The configured snapshot file could not be loaded.
    #[error("failed to load snapshot: {source}")]
    Snapshot {
        /// Underlying snapshot error.
        #[source]
        source: SnapshotError,
    },
    /// Two handlers conflict.
    #[error("failed to register method handlers: {source}")]
    Registry {
        /// Underlying registry conflict.
        #[source]
        source: RegistryError,
    },
}

/// Collaborators supplied to [`bootstrap_with`].
pub struct Services {
    /// Lifecycle observer.
    pub reporter: Arc<dyn HealthReporter>,
    /// Upstream state; when `None` the configured snapshot file is loaded, or
    /// an empty [`SharedSnapshot`] is used when no file is configured.
    pub upstream: Option<Arc<dyn SnapshotSource>>,
    /// Handler set; when `None` the reference handlers are registered.
    pub handlers: Option<Vec<Arc<dyn MethodHandler>>>,
}

impl Services {
    /// Default collaborators with the given reporter.
    #[must_use]
    pub fn new(reporter: Arc<dyn HealthReporter>) -> Self {
        Self {
            reporter,
            upstream: None,
            handlers: None,
        }
    }

    /// Serves state from `upstream` instead of the configured source.
    #[must_use]
    pub fn with_upstream(mut self, upstream: Arc<dyn SnapshotSource>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Registers `handlers` instead of the reference set.
    #[must_use]
    pub fn with_handlers(mut self, handlers: Vec<Arc<dyn MethodHandler>>) -> Self {
        self.handlers = Some(handlers);
        self
    }
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    upstream: Arc<dyn SnapshotSource>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Upstream state the daemon answers from.
    #[must_use]
    pub fn upstream(&self) -> &Arc<dyn SnapshotSource> {
        &self.upstream
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Lifecycle observer.
    #[must_use]
    pub fn reporter(&self) -> &Arc<dyn HealthReporter> {
        &self.reporter
    }

    /// Connection handler applying the configured framing and size limit.
    #[must_use]
    pub fn connection_handler(&self) -> Arc<DispatchConnectionHandler> {
        Arc::new(DispatchConnectionHandler::new(
            Arc::clone(&self.dispatcher),
            self.config.framing(),
            self.config.max_message_bytes(),
        ))
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first stage that fails; the reporter is
/// told about the failure before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    services: Services,
) -> Result<Daemon, BootstrapError> {
    let Services {
        reporter,
        upstream,
        handlers,
    } = services;
    reporter.bootstrap_starting();
    let fail = |error: BootstrapError| {
        reporter.bootstrap_failed(&error);
        error
    };

    let config = loader
        .load()
        .map_err(|source| fail(BootstrapError::Configuration { source }))?;
    let telemetry = telemetry::initialise(&config)
        .map_err(|source| fail(BootstrapError::Telemetry { source }))?;
    config
        .listen()
        .prepare_filesystem()
        .map_err(|source| fail(BootstrapError::Socket { source }))?;

    let upstream = match upstream {
        Some(source) => source,
        None => resolve_upstream(&config).map_err(|source| fail(BootstrapError::Snapshot { source }))?,
    };
    let handlers = handlers.unwrap_or_else(|| default_handlers(&upstream));
    let registry = HandlerRegistry::from_handlers(handlers)
        .map_err(|source| fail(BootstrapError::Registry { source }))?;
    reporter.handlers_registered(&registry);

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), Arc::clone(&upstream)));
    reporter.bootstrap_succeeded(&config);

    Ok(Daemon {
        config,
        dispatcher,
        upstream,
        telemetry,
        reporter,
    })
}

fn resolve_upstream(config: &Config) -> Result<Arc<dyn SnapshotSource>, SnapshotError> {
    match config.snapshot_path() {
        Some(path) => Ok(Arc::new(SnapshotFile::load(path)?)),
        None => Ok(Arc::new(SharedSnapshot::new())),
    }
}
