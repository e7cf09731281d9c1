//! Errors raised while loading snapshot sources.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures loading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file could not be read.
    #[error("failed to read snapshot file {path}: {source}")]
    Read {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The file is not a valid snapshot document.
    #[error("failed to parse snapshot file {path}: {source}")]
    Parse {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
