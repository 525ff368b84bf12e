//! Listening socket and the worker pool that accepts from it.

pub mod listener;

pub use listener::Server;
