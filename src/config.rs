//! Server configuration.
//!
//! Values come from built-in defaults, an optional YAML file, environment
//! variables and command-line flags, in increasing order of precedence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

/// Immutable server settings, read once at startup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
    /// Number of accept-and-serve workers.
    pub workers: usize,
    /// Directory every request target is resolved under.
    pub doc_root: String,
    /// Upper bound for reading a request head and for writing a response.
    pub request_timeout_secs: u64,
    /// Maximum length of one request line or header line, terminator included.
    pub max_line: usize,
    /// Maximum number of header lines in one request.
    pub max_headers: usize,
    /// How many times binding the listener is attempted.
    pub bind_attempts: u32,
    pub bind_retry_delay_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: 1,
            doc_root: ".".to_string(),
            request_timeout_secs: 30,
            max_line: 100,
            max_headers: 10,
            bind_attempts: 3,
            bind_retry_delay_secs: 3,
        }
    }
}

impl ServerConfig {
    /// Parses a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let cfg: ServerConfig =
            serde_yaml::from_str(yaml).context("invalid server configuration")?;
        Ok(cfg.normalized())
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    /// The `host:port` pair handed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_retry_delay(&self) -> Duration {
        Duration::from_secs(self.bind_retry_delay_secs)
    }

    fn normalized(mut self) -> Self {
        self.workers = self.workers.max(1);
        self.bind_attempts = self.bind_attempts.max(1);
        self
    }
}

/// Command-line surface of the `docserve` binary.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "docserve", version, about = "Serve static files over HTTP/1.1")]
pub struct Cli {
    /// Interface to bind
    #[arg(short = 'l', long, env = "DOCSERVE_HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long, env = "DOCSERVE_PORT")]
    pub port: Option<u16>,

    /// Directory to serve files from
    #[arg(short = 'r', long, env = "DOCSERVE_DOC_ROOT")]
    pub doc_root: Option<String>,

    /// Number of workers accepting connections
    #[arg(short, long, env = "DOCSERVE_WORKERS")]
    pub workers: Option<usize>,

    /// Optional YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Layers flags and environment on top of the file (or the defaults).
    pub fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut cfg = match &self.config {
            Some(path) => ServerConfig::from_yaml_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            cfg.host = host;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(doc_root) = self.doc_root {
            cfg.doc_root = doc_root;
        }
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }

        Ok(cfg.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_is_raised_to_one() {
        let cfg = ServerConfig::from_yaml_str("workers: 0").unwrap();
        assert_eq!(cfg.workers, 1);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli {
            port: Some(9000),
            workers: Some(4),
            ..Default::default()
        };
        let cfg = cli.into_config().unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.host, "127.0.0.1");
    }
}
