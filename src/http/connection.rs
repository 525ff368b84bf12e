use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;

use crate::config::ServerConfig;
use crate::http::parser::{read_request, ParseError};
use crate::http::reader::{LineReader, DEFAULT_MAX_HEADERS, DEFAULT_MAX_LINE};
use crate::http::request::Request;
use crate::http::response::StatusCode;
use crate::http::writer::ResponseWriter;
use crate::static_files::handler::{error_response, StaticHandler};

/// Per-connection framing limits and deadlines.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub max_line: usize,
    pub max_headers: usize,
    /// Bounds reading the request head, and separately writing the response.
    pub timeout: Duration,
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self {
            max_line: DEFAULT_MAX_LINE,
            max_headers: DEFAULT_MAX_HEADERS,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ServerConfig> for ConnectionLimits {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            max_line: cfg.max_line,
            max_headers: cfg.max_headers,
            timeout: cfg.request_timeout(),
        }
    }
}

pub struct Connection<S> {
    stream: S,
    handler: Arc<StaticHandler>,
    limits: ConnectionLimits,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, handler: Arc<StaticHandler>, limits: ConnectionLimits) -> Self {
        Self {
            stream,
            handler,
            limits,
            state: ConnectionState::Reading,
        }
    }

    /// Serves exactly one request, then stops. The caller drops the stream.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    let read = timeout(self.limits.timeout, self.read_request()).await;
                    self.state = match read {
                        Err(_) => {
                            return Err(anyhow::anyhow!(
                                "timed out after {:?} waiting for request",
                                self.limits.timeout
                            ));
                        }
                        Ok(Ok(Some(req))) => ConnectionState::Processing(req),
                        Ok(Ok(None)) => ConnectionState::Closed,
                        Ok(Err(ParseError::Io(e))) => return Err(e.into()),
                        Ok(Err(e)) => {
                            tracing::warn!(error = %e, "Rejecting malformed request");
                            let response = error_response(StatusCode::BadRequest);
                            ConnectionState::Writing(ResponseWriter::new(&response))
                        }
                    };
                }

                ConnectionState::Processing(req) => {
                    let response = self.handler.handle(req).await;

                    tracing::info!(
                        method = %req.method,
                        uri = %req.target,
                        status = response.status.as_u16(),
                        "Request served"
                    );

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    timeout(self.limits.timeout, writer.write_to_stream(&mut self.stream))
                        .await
                        .map_err(|_| anyhow::anyhow!("timed out writing response"))??;

                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    pub async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        let mut reader = LineReader::with_limit(&mut self.stream, self.limits.max_line);
        read_request(&mut reader, self.limits.max_headers).await
    }
}
