//! Shared fixtures and doubles for the daemon test suites.

mod client;
mod config_loader;
mod handlers;
mod reporter;
mod snapshot;

pub use client::TestClient;
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use handlers::{MockHandler, PanickingHandler, StubHandler};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use snapshot::sample_snapshot;
