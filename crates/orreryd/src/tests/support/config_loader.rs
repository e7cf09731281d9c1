//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use orrery_config::{Config, Framing, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that provisions a Unix socket path under a temporary directory.
#[derive(Clone)]
pub struct TestConfigLoader {
    socket_dir: Arc<TempDir>,
    framing: Framing,
    snapshot_path: Option<Utf8PathBuf>,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new(framing: Framing) -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        Self {
            socket_dir: Arc::new(dir),
            framing,
            snapshot_path: None,
        }
    }

    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Directory that holds the socket; usable for other scratch files.
    #[must_use]
    pub fn scratch_dir(&self) -> &Utf8Path {
        Utf8Path::from_path(self.socket_dir.path())
            .expect("temporary directory path was not valid UTF-8")
    }

    #[must_use]
    pub fn socket_path(&self) -> Utf8PathBuf {
        self.scratch_dir().join("run").join("orreryd.sock")
    }

    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            listen: SocketEndpoint::unix(self.socket_path()),
            framing: self.framing,
            snapshot_path: self.snapshot_path.clone(),
            ..Config::default()
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config())
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("orreryd"),
            OsString::from("--listen"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
