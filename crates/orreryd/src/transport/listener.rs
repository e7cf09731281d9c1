//! Accept loop for the snapshot server socket.
//!
//! The listener polls a non-blocking socket so the accept thread can notice
//! shutdown requests between connections. Every accepted client is handed to
//! the [`ConnectionHandler`] on a thread of its own.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use orrery_config::SocketEndpoint;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::os::unix::net::UnixListener;

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use orrery_config::SocketOccupancy;

const IDLE_POLL: Duration = Duration::from_millis(25);
const ERROR_PAUSE: Duration = Duration::from_millis(150);

/// Listener bound to the configured endpoint, not yet accepting.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: SocketEndpoint,
    acceptor: Acceptor,
    #[cfg(unix)]
    _socket_file: SocketFile,
}

impl SocketListener {
    /// Binds `endpoint`. A Unix socket file left behind by a previous run is
    /// replaced; one that a running process still accepts on is not.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the address cannot be resolved or bound,
    /// or the Unix socket path is live or holds something else.
    pub fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let acceptor = Acceptor::bind(endpoint)?;
        Ok(Self {
            endpoint: endpoint.clone(),
            acceptor,
            #[cfg(unix)]
            _socket_file: SocketFile(endpoint.unix_path().map(Utf8Path::to_path_buf)),
        })
    }

    /// Bound TCP address; `None` for Unix sockets.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.acceptor {
            Acceptor::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Acceptor::Unix(_) => None,
        }
    }

    /// Starts accepting on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::NonBlocking`] when the socket cannot be
    /// switched to non-blocking mode, or [`ListenerError::Spawn`] when the
    /// accept thread cannot be created.
    pub fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.acceptor
            .set_nonblocking()
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let accept_loop = AcceptLoop {
            listener: self,
            shutdown: Arc::clone(&shutdown),
            handler,
        };
        let thread = thread::Builder::new()
            .name(String::from("orreryd-accept"))
            .spawn(move || accept_loop.run())
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            thread: Some(thread),
        })
    }
}

/// Handle to the background accept thread.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop. Connections already accepted keep running
    /// until their clients disconnect.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop to exit and release the socket.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the accept thread panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Debug)]
enum Acceptor {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Acceptor {
    fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        match endpoint {
            SocketEndpoint::Tcp { host, port } => bind_tcp(host, *port).map(Self::Tcp),
            #[cfg(unix)]
            SocketEndpoint::Unix { path } => bind_unix(endpoint, path).map(Self::Unix),
            #[cfg(not(unix))]
            SocketEndpoint::Unix { .. } => Err(ListenerError::UnsupportedUnix {
                endpoint: endpoint.to_string(),
            }),
        }
    }

    fn set_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix(listener) => listener.set_nonblocking(true),
        }
    }

    /// Accepts one pending client, or `None` when nobody is waiting.
    fn poll(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match self {
            Self::Tcp(listener) => listener.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                stream.set_nodelay(true)?;
                Ok(ConnectionStream::Tcp(stream))
            }),
            #[cfg(unix)]
            Self::Unix(listener) => listener.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Unix(stream))
            }),
        };
        match accepted {
            Ok(stream) => Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

struct AcceptLoop {
    listener: SocketListener,
    shutdown: Arc<AtomicBool>,
    handler: Arc<dyn ConnectionHandler>,
}

impl AcceptLoop {
    fn run(self) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.listener.endpoint,
            "accepting connections"
        );
        let mut failing = None::<io::ErrorKind>;
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.acceptor.poll() {
                Ok(Some(stream)) => {
                    failing = None;
                    self.serve(stream);
                }
                Ok(None) => thread::sleep(IDLE_POLL),
                Err(error) => {
                    if failing != Some(error.kind()) {
                        warn!(target: LISTENER_TARGET, %error, "accept failed");
                    }
                    failing = Some(error.kind());
                    thread::sleep(ERROR_PAUSE);
                }
            }
        }
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.listener.endpoint,
            "stopped accepting connections"
        );
    }

    fn serve(&self, stream: ConnectionStream) {
        let peer = stream.peer();
        debug!(target: LISTENER_TARGET, %peer, "connection accepted");
        let handler = Arc::clone(&self.handler);
        if let Err(error) = thread::Builder::new()
            .name(String::from("orreryd-conn"))
            .spawn(move || handler.handle(stream))
        {
            warn!(
                target: LISTENER_TARGET,
                %peer,
                %error,
                "could not start connection thread"
            );
        }
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(unix)]
fn bind_unix(endpoint: &SocketEndpoint, path: &Utf8Path) -> Result<UnixListener, ListenerError> {
    let occupancy = endpoint
        .occupancy()
        .map_err(|source| ListenerError::UnixProbe {
            path: path.to_path_buf(),
            source,
        })?;
    match occupancy {
        SocketOccupancy::Vacant => {}
        SocketOccupancy::Stale => {
            info!(target: LISTENER_TARGET, %path, "replacing stale socket file");
            std::fs::remove_file(path).map_err(|source| ListenerError::UnixCleanup {
                path: path.to_path_buf(),
                source,
            })?;
        }
        SocketOccupancy::Live => {
            return Err(ListenerError::UnixInUse {
                path: path.to_path_buf(),
            });
        }
        SocketOccupancy::Foreign => {
            return Err(ListenerError::UnixNotSocket {
                path: path.to_path_buf(),
            });
        }
    }
    UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
        path: path.to_path_buf(),
        source,
    })
}

/// Removes the bound socket file once the listener is dropped.
#[cfg(unix)]
#[derive(Debug)]
struct SocketFile(Option<Utf8PathBuf>);

#[cfg(unix)]
impl Drop for SocketFile {
    fn drop(&mut self) {
        let Some(path) = self.0.take() else {
            return;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(target: LISTENER_TARGET, %path, "removed socket file"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                warn!(target: LISTENER_TARGET, %path, %error, "could not remove socket file");
            }
        }
    }
}
