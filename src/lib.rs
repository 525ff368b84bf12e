//! docserve - static file HTTP/1.1 server
//!
//! Core library for request parsing, path resolution, response building and
//! the worker pool.

pub mod config;
pub mod http;
pub mod server;
pub mod static_files;
