//! Blocking client speaking either framing, for end-to-end scenarios.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use orrery_config::Framing;
use tungstenite::{Message, WebSocket};

const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Byte stream the client can sit on.
pub trait Duplex: Read + Write + Send {}

impl<T: Read + Write + Send> Duplex for T {}

/// One client connection.
pub enum TestClient {
    Jsonl(BufReader<Box<dyn Duplex>>),
    WebSocket(Box<WebSocket<Box<dyn Duplex>>>),
}

impl TestClient {
    /// Connects over TCP.
    pub fn connect_tcp(address: SocketAddr, framing: Framing) -> Result<Self, String> {
        let stream = TcpStream::connect(address).map_err(|error| error.to_string())?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|error| error.to_string())?;
        Self::over(Box::new(stream), framing)
    }

    /// Connects to a Unix domain socket.
    pub fn connect_unix(path: &Path, framing: Framing) -> Result<Self, String> {
        let stream = UnixStream::connect(path).map_err(|error| error.to_string())?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|error| error.to_string())?;
        Self::over(Box::new(stream), framing)
    }

    fn over(stream: Box<dyn Duplex>, framing: Framing) -> Result<Self, String> {
        match framing {
            Framing::Jsonl => Ok(Self::Jsonl(BufReader::new(stream))),
            Framing::Websocket => {
                let (socket, _) = tungstenite::client("ws://localhost/", stream)
                    .map_err(|error| format!("websocket handshake failed: {error}"))?;
                Ok(Self::WebSocket(Box::new(socket)))
            }
        }
    }

    /// Sends one request message.
    pub fn send(&mut self, text: &str) -> Result<(), String> {
        match self {
            Self::Jsonl(reader) => {
                let stream = reader.get_mut();
                stream
                    .write_all(text.as_bytes())
                    .and_then(|()| stream.write_all(b"\n"))
                    .and_then(|()| stream.flush())
                    .map_err(|error| error.to_string())
            }
            Self::WebSocket(socket) => socket
                .send(Message::text(text.to_owned()))
                .map_err(|error| error.to_string()),
        }
    }

    /// Writes raw bytes without any framing. JSONL only.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<(), String> {
        match self {
            Self::Jsonl(reader) => {
                let stream = reader.get_mut();
                stream
                    .write_all(bytes)
                    .and_then(|()| stream.flush())
                    .map_err(|error| error.to_string())
            }
            Self::WebSocket(_) => Err(String::from("raw writes need the jsonl framing")),
        }
    }

    /// Sends a binary frame. WebSocket only.
    pub fn send_binary(&mut self, bytes: Vec<u8>) -> Result<(), String> {
        match self {
            Self::WebSocket(socket) => socket
                .send(Message::binary(bytes))
                .map_err(|error| error.to_string()),
            Self::Jsonl(_) => Err(String::from("binary frames need the websocket framing")),
        }
    }

    /// Reads the next reply; `None` once the server has closed the connection.
    pub fn receive(&mut self) -> Result<Option<String>, String> {
        match self {
            Self::Jsonl(reader) => {
                let mut line = String::new();
                let read = reader
                    .read_line(&mut line)
                    .map_err(|error| error.to_string())?;
                if read == 0 {
                    return Ok(None);
                }
                Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
            }
            Self::WebSocket(socket) => loop {
                match socket.read() {
                    Ok(Message::Text(text)) => return Ok(Some(text.as_str().to_owned())),
                    Ok(Message::Close(_))
                    | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                        return Ok(None);
                    }
                    Ok(_) => {}
                    Err(error) => return Err(error.to_string()),
                }
            },
        }
    }

    /// Sends `text` and waits for its reply.
    pub fn request(&mut self, text: &str) -> Result<String, String> {
        self.send(text)?;
        self.receive()?
            .ok_or_else(|| String::from("connection closed before a reply arrived"))
    }

    /// Closes the connection politely.
    pub fn close(mut self) {
        if let Self::WebSocket(socket) = &mut self {
            let _ = socket.close(None);
            let _ = socket.flush();
        }
    }
}
