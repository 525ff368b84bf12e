//! Turns a parsed request into a response.

use std::path::Path;

use chrono::{DateTime, Local};
use tokio::io::AsyncReadExt;

use crate::http::mime::content_type_for;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::static_files::resolver::PathResolver;

pub const SERVER_NAME: &str = concat!("docserve/", env!("CARGO_PKG_VERSION"));

const DATE_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

pub fn format_date(now: DateTime<Local>) -> String {
    now.format(DATE_FORMAT).to_string()
}

/// Serves GET and HEAD requests from a document root.
#[derive(Debug, Clone)]
pub struct StaticHandler {
    resolver: PathResolver,
}

impl StaticHandler {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Builds the response for one request. Every branch ends in a response.
    pub async fn handle(&self, req: &Request) -> Response {
        let builder = base_headers();

        if !req.method.is_served() || !req.is_http11() {
            return builder.status(StatusCode::MethodNotAllowed).build();
        }

        let path = match self.resolver.resolve(&req.target).await {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(uri = %req.target, error = %e, "Resolution failed");
                return builder.status(StatusCode::NotFound).build();
            }
        };

        match req.method {
            Method::GET => match read_file(&path).await {
                Ok(contents) => {
                    let builder = match content_type_for(&path) {
                        Some(content_type) => builder.header("Content-Type", content_type),
                        None => builder,
                    };
                    builder.status(StatusCode::Ok).body(contents).build()
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Cannot read file");
                    builder.status(StatusCode::NotFound).build()
                }
            },
            // HEAD answers from the gate alone; the file is neither opened nor stat'ed.
            _ => builder.status(StatusCode::Ok).build(),
        }
    }
}

/// `Connection`, `Server` and `Date`, stamped now.
pub fn base_headers() -> ResponseBuilder {
    ResponseBuilder::new(StatusCode::Ok)
        .header("Connection", "close")
        .header("Server", SERVER_NAME)
        .header("Date", format_date(Local::now()))
}

/// A body-less error response carrying the base headers.
pub fn error_response(status: StatusCode) -> Response {
    base_headers().status(status).build()
}

async fn read_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    let meta = file.metadata().await?;
    if !meta.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }

    let mut contents = Vec::with_capacity(meta.len() as usize);
    file.read_to_end(&mut contents).await?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_is_month_day_year_then_time() {
        let when = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(format_date(when), "03/07/2024, 09:05:01");
    }
}
