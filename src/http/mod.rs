//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one request per connection, GET and
//! HEAD only, no request bodies, and the connection closes after the response.
//!
//! # Architecture
//!
//! - **`reader`**: reads CRLF/LF-terminated lines under a length limit
//! - **`parser`**: turns the request line and header lines into a `Request`
//! - **`request`**: request representation and method tokens
//! - **`response`**: status table and response builder
//! - **`writer`**: serializes a response and writes it to the client
//! - **`mime`**: content type from file extension
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read request line and headers
//!        └──────┬──────┘
//!               ├─ Protocol error → Writing (400)
//!               ├─ Peer closed    → Closed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Resolve target, build response
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response, shut down write side
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docserve::http::connection::{Connection, ConnectionLimits};
//! use docserve::static_files::{PathResolver, StaticHandler};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let handler = Arc::new(StaticHandler::new(PathResolver::new("./public")));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let mut conn = Connection::new(socket, Arc::clone(&handler), ConnectionLimits::default());
//!         if let Err(e) = conn.run().await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod writer;
