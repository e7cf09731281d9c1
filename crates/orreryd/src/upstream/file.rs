//! Snapshot loaded once from a JSON file.

use std::fs;
use std::sync::Arc;

use camino::Utf8Path;
use tracing::info;

use super::errors::SnapshotError;
use super::model::Snapshot;
use super::source::SnapshotSource;
use super::UPSTREAM_TARGET;

/// Source serving a fixed snapshot read at startup.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    snapshot: Arc<Snapshot>,
}

impl SnapshotFile {
    /// Reads and parses `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the file cannot be read or does not hold
    /// a snapshot document.
    pub fn load(path: &Utf8Path) -> Result<Self, SnapshotError> {
        let text = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_owned(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
                path: path.to_owned(),
                source,
            })?;
        info!(
            target: UPSTREAM_TARGET,
            path = %path,
            stars = snapshot.galaxy.star_count(),
            "loaded snapshot file"
        );
        Ok(Self {
            snapshot: Arc::new(snapshot),
        })
    }
}

impl SnapshotSource for SnapshotFile {
    fn current(&self) -> Option<Arc<Snapshot>> {
        Some(Arc::clone(&self.snapshot))
    }
}
