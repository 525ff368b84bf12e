use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Renders a response into its exact wire bytes.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let body_len = resp.body.as_ref().map_or(0, Vec::len);
    let mut buf = Vec::with_capacity(128 + body_len);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.reason()
    );
    encode_latin1(&status_line, &mut buf);

    for (k, v) in &resp.headers {
        encode_latin1(k, &mut buf);
        buf.extend_from_slice(b": ");
        encode_latin1(v, &mut buf);
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");

    if let Some(body) = &resp.body {
        buf.extend_from_slice(body);
    }

    buf
}

/// One char, one byte. Anything above U+00FF becomes `?`.
fn encode_latin1(text: &str, buf: &mut Vec<u8>) {
    buf.extend(text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')));
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    /// Writes every byte, flushes, then shuts down the write side.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        stream.shutdown().await?;

        Ok(())
    }
}
