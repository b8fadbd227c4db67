use std::io::{self, Read};

use bytes::BytesMut;

/// Frames a byte stream into newline-delimited lines, growing an internal
/// buffer as needed rather than assuming any frame fits in one `read`.
///
/// Generic over `Read` so the same framing logic drives both a live
/// `TcpStream` and, in tests, an in-memory byte slice.
pub struct LineTransport<S> {
    stream: S,
    buffer: BytesMut,
    read_chunk: usize,
}

impl<S: Read> LineTransport<S> {
    pub fn new(stream: S) -> Self {
        Self::with_chunk_size(stream, 4096)
    }

    pub fn with_chunk_size(stream: S, read_chunk: usize) -> Self {
        Self {
            stream,
            buffer: BytesMut::new(),
            read_chunk,
        }
    }

    /// Returns the next line with its terminator stripped, or `Ok(None)` on
    /// clean end-of-stream. A final unterminated chunk at EOF is still
    /// returned once, as if newline-terminated, rather than discarded.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let mut line = self.buffer.split_to(pos + 1);
                line.truncate(line.len() - 1);
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(Some(String::from_utf8_lossy(&line).trim().to_owned()));
            }

            let mut chunk = vec![0u8; self.read_chunk];
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let text = String::from_utf8_lossy(&self.buffer).trim().to_owned();
                self.buffer.clear();
                return Ok(if text.is_empty() { None } else { Some(text) });
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
