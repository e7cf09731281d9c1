//! Simulation state as seen by method handlers.
//!
//! Handlers never reach into the simulation directly. They hold an
//! `Arc<dyn SnapshotSource>` and read an immutable [`Snapshot`] per request.

mod errors;
mod file;
mod model;
mod source;

pub use errors::SnapshotError;
pub use file::SnapshotFile;
pub use model::{Environment, Galaxy, Planet, Position, ResourceDeposit, Snapshot, Star};
pub use source::{SharedSnapshot, SnapshotSource};

const UPSTREAM_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::upstream");
