use std::fmt;
use std::fs::DirBuilder;
use std::io;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Address the snapshot server listens on.
///
/// Serialised as its URL form (`tcp://host:port` or `unix:///path`) so the
/// same text works in files, environment variables and flags.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum SocketEndpoint {
    /// Unix domain socket endpoint.
    Unix {
        /// Filesystem location of the socket.
        path: Utf8PathBuf,
    },
    /// TCP socket endpoint.
    Tcp {
        /// Host name or address to bind.
        host: String,
        /// Port to bind; `0` asks the OS for an ephemeral port.
        port: u16,
    },
}

impl SocketEndpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP socket endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Returns the Unix socket path when the endpoint uses the Unix transport.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }

    /// Ensures a Unix socket's parent directory exists with restrictive
    /// permissions. TCP endpoints need no preparation.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the path has no parent or the
    /// directory cannot be created.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(path) = self.unix_path() else {
            return Ok(());
        };
        let Some(parent) = path.parent() else {
            return Err(SocketPreparationError::MissingParent {
                path: path.to_path_buf(),
            });
        };
        if parent.as_str().is_empty() {
            return Ok(());
        }

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        if let Err(source) = builder.create(parent.as_std_path())
            && source.kind() != io::ErrorKind::AlreadyExists
        {
            return Err(SocketPreparationError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            });
        }

        Ok(())
    }
}

/// What currently sits at a Unix socket path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOccupancy {
    /// Nothing exists at the path.
    Vacant,
    /// A socket file remains but nothing accepts connections on it.
    Stale,
    /// Another process is accepting connections on the socket.
    Live,
    /// The path holds something other than a socket.
    Foreign,
}

#[cfg(unix)]
impl SocketEndpoint {
    /// Inspects the Unix socket path by connecting to it. TCP endpoints are
    /// always reported as [`SocketOccupancy::Vacant`].
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error when the path cannot be inspected or
    /// the connection attempt fails for a reason other than refusal.
    pub fn occupancy(&self) -> io::Result<SocketOccupancy> {
        use std::os::unix::fs::FileTypeExt;
        use std::os::unix::net::UnixStream;

        let Some(path) = self.unix_path() else {
            return Ok(SocketOccupancy::Vacant);
        };
        let metadata = match std::fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(SocketOccupancy::Vacant);
            }
            Err(error) => return Err(error),
        };
        if !metadata.file_type().is_socket() {
            return Ok(SocketOccupancy::Foreign);
        }
        match UnixStream::connect(path) {
            Ok(_) => Ok(SocketOccupancy::Live),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
                ) =>
            {
                Ok(SocketOccupancy::Stale)
            }
            Err(error) => Err(error),
        }
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "unix" => {
                let path = url.path();
                if path.is_empty() {
                    return Err(SocketParseError::MissingUnixPath(input.to_owned()));
                }
                Ok(Self::unix(path))
            }
            "tcp" | "ws" => {
                let host = url
                    .host_str()
                    .ok_or_else(|| SocketParseError::MissingHost(input.to_owned()))?;
                let port = url
                    .port()
                    .ok_or_else(|| SocketParseError::MissingPort(input.to_owned()))?;
                Ok(Self::tcp(host, port))
            }
            other => Err(SocketParseError::UnsupportedScheme(other.to_owned())),
        }
    }
}

impl TryFrom<String> for SocketEndpoint {
    type Error = SocketParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SocketEndpoint> for String {
    fn from(endpoint: SocketEndpoint) -> Self {
        endpoint.to_string()
    }
}

/// Errors encountered while parsing a [`SocketEndpoint`] from text.
#[derive(Debug, Error)]
pub enum SocketParseError {
    /// Scheme was not recognised.
    #[error("unsupported socket scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host name was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing from the address.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// Unix socket path was absent.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Errors raised when preparing socket directories.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// Parent directory is missing when creating a Unix socket path.
    #[error("socket path '{path}' has no parent directory")]
    MissingParent {
        /// Offending socket path.
        path: Utf8PathBuf,
    },
    /// Failed to create or adjust socket directories.
    #[error("failed to create socket directory '{path}': {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn display_unix_socket() {
        let endpoint = SocketEndpoint::unix(Utf8PathBuf::from("/tmp/orrery.sock"));
        assert_eq!(endpoint.to_string(), "unix:///tmp/orrery.sock");
    }

    #[rstest]
    #[case::tcp("tcp://127.0.0.1:9000", 9000)]
    #[case::websocket_alias("ws://localhost:18181/", 18181)]
    fn parse_tcp_socket(#[case] input: &str, #[case] expected_port: u16) {
        let endpoint: SocketEndpoint = input.parse().expect("parse endpoint");
        assert!(matches!(endpoint, SocketEndpoint::Tcp { port, .. } if port == expected_port));
    }

    #[test]
    fn parse_rejects_missing_port() {
        let error = "tcp://127.0.0.1"
            .parse::<SocketEndpoint>()
            .expect_err("port is required");
        assert!(matches!(error, SocketParseError::MissingPort(_)));
    }

    #[test]
    fn parse_rejects_unknown_scheme() {
        let error = "http://127.0.0.1:80"
            .parse::<SocketEndpoint>()
            .expect_err("http is not a socket scheme");
        assert!(matches!(error, SocketParseError::UnsupportedScheme(scheme) if scheme == "http"));
    }

    #[test]
    fn prepare_filesystem_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let socket = dir.path().join("nested").join("orrery.sock");
        let endpoint = SocketEndpoint::unix(
            Utf8PathBuf::from_path_buf(socket.clone()).expect("utf8 path"),
        );

        endpoint.prepare_filesystem().expect("prepare filesystem");

        let parent = socket.parent().expect("socket parent");
        assert!(parent.is_dir());
    }

    #[test]
    fn prepare_filesystem_ignores_tcp() {
        let endpoint = SocketEndpoint::tcp("127.0.0.1", 0);
        assert!(endpoint.prepare_filesystem().is_ok());
    }

    #[cfg(unix)]
    mod occupancy {
        use std::os::unix::net::UnixListener;

        use tempfile::TempDir;

        use super::*;

        fn socket_in(dir: &TempDir) -> (Utf8PathBuf, SocketEndpoint) {
            let path = Utf8PathBuf::from_path_buf(dir.path().join("orrery.sock"))
                .expect("utf8 temp path");
            let endpoint = SocketEndpoint::unix(path.clone());
            (path, endpoint)
        }

        #[test]
        fn tcp_endpoints_are_vacant() {
            let endpoint = SocketEndpoint::tcp("127.0.0.1", 0);
            assert_eq!(endpoint.occupancy().expect("inspect socket path"), SocketOccupancy::Vacant);
        }

        #[test]
        fn missing_path_is_vacant() {
            let dir = TempDir::new().expect("temp dir");
            let (_, endpoint) = socket_in(&dir);
            assert_eq!(endpoint.occupancy().expect("inspect socket path"), SocketOccupancy::Vacant);
        }

        #[test]
        fn abandoned_socket_is_stale() {
            let dir = TempDir::new().expect("temp dir");
            let (path, endpoint) = socket_in(&dir);
            drop(UnixListener::bind(&path).expect("bind"));
            assert_eq!(endpoint.occupancy().expect("inspect socket path"), SocketOccupancy::Stale);
        }

        #[test]
        fn accepting_socket_is_live() {
            let dir = TempDir::new().expect("temp dir");
            let (path, endpoint) = socket_in(&dir);
            let _listener = UnixListener::bind(&path).expect("bind");
            assert_eq!(endpoint.occupancy().expect("inspect socket path"), SocketOccupancy::Live);
        }

        #[test]
        fn regular_file_is_foreign() {
            let dir = TempDir::new().expect("temp dir");
            let (path, endpoint) = socket_in(&dir);
            std::fs::write(&path, b"orbit").expect("write file");
            assert_eq!(endpoint.occupancy().expect("inspect socket path"), SocketOccupancy::Foreign);
        }
    }
}
