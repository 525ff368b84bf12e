use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::http::reader::LineReader;
use crate::http::request::{Method, Request};

/// Protocol errors raised while reading or parsing a request head.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,
    #[error("malformed request line: {0:?}")]
    InvalidRequestLine(String),
    #[error("header line without ':': {0:?}")]
    InvalidHeader(String),
    #[error("line longer than {limit} bytes")]
    LineTooLong { limit: usize },
    #[error("more than {limit} header lines")]
    TooManyHeaders { limit: usize },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Splits a request line into method, decoded target and version.
///
/// The line must be exactly three non-empty tokens separated by single spaces.
pub fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
    if line.is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidRequestLine(line.to_string()));
    };

    if method.is_empty() || target.is_empty() || version.is_empty() {
        return Err(ParseError::InvalidRequestLine(line.to_string()));
    }

    Ok((
        Method::parse(method),
        decode_target(target),
        version.to_string(),
    ))
}

/// Drops the query string, then form-decodes the path.
///
/// `+` becomes a space and `%XX` escapes are decoded. Bytes that do not form
/// valid UTF-8 are replaced with U+FFFD.
pub fn decode_target(raw: &str) -> String {
    let path = raw.split_once('?').map_or(raw, |(path, _)| path);
    let path = path.replace('+', " ");
    percent_decode_str(&path).decode_utf8_lossy().into_owned()
}

/// Splits a header line on its first colon.
///
/// The name is kept verbatim; spaces and tabs around the value are trimmed.
pub fn parse_header_line(line: &str) -> Result<(String, String), ParseError> {
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;

    Ok((
        key.to_string(),
        value.trim_matches(|c: char| c == ' ' || c == '\t').to_string(),
    ))
}

/// Reads and parses one request head.
///
/// Returns `Ok(None)` when the peer closed without sending anything.
pub async fn read_request<R>(
    reader: &mut LineReader<R>,
    max_headers: usize,
) -> Result<Option<Request>, ParseError>
where
    R: AsyncRead + Unpin,
{
    let Some(request_line) = reader.read_line().await? else {
        return Ok(None);
    };
    let (method, target, version) = parse_request_line(&request_line)?;

    let mut headers = HashMap::new();
    let mut count = 0;

    while let Some(line) = reader.read_line().await? {
        if line.is_empty() {
            break;
        }

        count += 1;
        if count > max_headers {
            return Err(ParseError::TooManyHeaders { limit: max_headers });
        }

        let (key, value) = parse_header_line(&line)?;
        headers.insert(key, value);
    }

    Ok(Some(Request {
        method,
        target,
        version,
        headers,
    }))
}
