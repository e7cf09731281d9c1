//! Snapshot server for a running simulation.
//!
//! The daemon accepts persistent socket connections and answers JSON-RPC
//! style requests about the simulation's state. Each connection gets its own
//! thread; every inbound message is one request and produces exactly one
//! reply.
//!
//! The runtime is assembled once by [`bootstrap_with`]: configuration is
//! loaded through [`orrery_config`], telemetry is installed, the upstream
//! [`SnapshotSource`] is chosen, and the method handlers are frozen into a
//! [`HandlerRegistry`] shared by every connection. [`run_daemon`] then binds the
//! configured endpoint and serves until a termination signal arrives.
//!
//! Handlers only see the simulation through an `Arc<dyn SnapshotSource>` and
//! build their results with the streaming
//! [`DocumentBuilder`](orrery_protocol::DocumentBuilder), so the daemon never
//! materializes a JSON tree for outbound data.

mod bootstrap;
pub mod dispatch;
pub mod handlers;
mod health;
pub mod process;
pub mod registry;
mod telemetry;
pub mod transport;
pub mod upstream;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, Services, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use dispatch::{DispatchConnectionHandler, Dispatcher};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, LaunchPlan, run_daemon, run_daemon_with};
pub use registry::{HandlerRegistry, RegistryBuilder, RegistryError};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};
pub use upstream::{SharedSnapshot, Snapshot, SnapshotFile, SnapshotSource};

#[cfg(test)]
mod tests;
