//! Newline-delimited framing: one request per line, one reply per line.

use std::io::{self, Read, Write};
use std::mem;

use super::TransportError;
use super::messages::{Inbound, MessageStream};

const READ_CHUNK: usize = 4096;

/// Line-framed message stream.
pub struct JsonlStream<S> {
    stream: S,
    buffer: Vec<u8>,
    limit: usize,
    eof: bool,
}

impl<S> JsonlStream<S> {
    /// Wraps `stream`, rejecting lines longer than `limit` bytes.
    pub const fn new(stream: S, limit: usize) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            limit,
            eof: false,
        }
    }

    /// Removes the next complete line from the buffer, without its newline.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.buffer.iter().position(|byte| *byte == b'\n')?;
        let rest = self.buffer.split_off(newline + 1);
        let mut line = mem::replace(&mut self.buffer, rest);
        line.pop();
        Some(line)
    }

    fn classify(&self, line: &[u8]) -> Option<Inbound> {
        if line.len() > self.limit {
            return Some(Inbound::Oversized {
                size: line.len(),
                recoverable: true,
            });
        }
        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(error) => {
                return Some(Inbound::NotUtf8 {
                    valid_up_to: error.valid_up_to(),
                });
            }
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Inbound::Text(trimmed.to_owned()))
        }
    }
}

impl<S: Read + Write> MessageStream for JsonlStream<S> {
    fn next_message(&mut self) -> Result<Option<Inbound>, TransportError> {
        loop {
            if let Some(line) = self.take_line() {
                match self.classify(&line) {
                    Some(message) => return Ok(Some(message)),
                    None => continue,
                }
            }

            if self.eof {
                // A final line without a trailing newline still counts.
                let rest = mem::take(&mut self.buffer);
                return Ok(self.classify(&rest));
            }

            if self.buffer.len() > self.limit {
                let size = self.buffer.len();
                self.buffer.clear();
                self.eof = true;
                return Ok(Some(Inbound::Oversized {
                    size,
                    recoverable: false,
                }));
            }

            self.fill()?;
        }
    }

    fn send(&mut self, reply: String) -> Result<(), TransportError> {
        let mut line = reply.into_bytes();
        line.push(b'\n');
        self.stream.write_all(&line)?;
        self.stream.flush()?;
        Ok(())
    }
}

impl<S: Read> JsonlStream<S> {
    fn fill(&mut self) -> Result<(), TransportError> {
        let mut chunk = [0_u8; READ_CHUNK];
        let read = read_with_retry(&mut self.stream, &mut chunk)?;
        if read == 0 {
            self.eof = true;
        } else {
            self.buffer
                .extend_from_slice(chunk.get(..read).unwrap_or_default());
        }
        Ok(())
    }
}

/// Reads from the stream, retrying on interrupts.
fn read_with_retry(stream: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}
