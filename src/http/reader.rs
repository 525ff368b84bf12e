//! Line-oriented reading of a request head.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::parser::ParseError;

/// Longest accepted line, terminator included.
pub const DEFAULT_MAX_LINE: usize = 100;

/// Most header lines accepted after the request line.
pub const DEFAULT_MAX_HEADERS: usize = 10;

/// Reads CRLF- or LF-terminated lines from a byte stream.
///
/// The reader never asks the stream for more than the rest of the current
/// line limit, so at most one line is ever buffered.
pub struct LineReader<R> {
    inner: R,
    buffer: BytesMut,
    max_line: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, DEFAULT_MAX_LINE)
    }

    pub fn with_limit(inner: R, max_line: usize) -> Self {
        let max_line = max_line.max(1);
        Self {
            inner,
            buffer: BytesMut::with_capacity(max_line),
            max_line,
        }
    }

    /// Reads the next line without its terminator.
    ///
    /// Returns `Ok(None)` when the stream ends before any byte of a new line.
    /// A stream that ends in the middle of a line yields that partial line.
    pub async fn read_line(&mut self) -> Result<Option<String>, ParseError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                if pos + 1 > self.max_line {
                    return Err(ParseError::LineTooLong { limit: self.max_line });
                }
                let line = self.buffer.split_to(pos + 1);
                return Ok(Some(decode_latin1(strip_terminator(&line))));
            }

            if self.buffer.len() >= self.max_line {
                return Err(ParseError::LineTooLong { limit: self.max_line });
            }

            let want = (self.max_line - self.buffer.len()) as u64;
            let n = (&mut self.inner)
                .take(want)
                .read_buf(&mut self.buffer)
                .await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let line = self.buffer.split();
                return Ok(Some(decode_latin1(strip_terminator(&line))));
            }
        }
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// One byte, one char. Never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
