use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{info, Instrument};

use crate::config::ServerConfig;
use crate::http::connection::{Connection, ConnectionLimits};
use crate::static_files::{PathResolver, StaticHandler};

/// Pause after a failed accept, so a persistent error (e.g. EMFILE) cannot spin a worker.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// A bound listening socket plus everything the workers share read-only.
pub struct Server {
    listener: Arc<TcpListener>,
    handler: Arc<StaticHandler>,
    limits: ConnectionLimits,
    workers: usize,
}

impl Server {
    /// Binds the listening socket, retrying as configured.
    ///
    /// Failing every attempt is fatal and names the address in the error.
    pub async fn bind(cfg: &ServerConfig) -> anyhow::Result<Self> {
        let addr = cfg.listen_addr();
        let listener = bind_with_retry(&addr, cfg.bind_attempts, cfg.bind_retry_delay())
            .await
            .with_context(|| format!("failed to create listening socket on {addr}"))?;

        if !std::path::Path::new(&cfg.doc_root).is_dir() {
            tracing::warn!(doc_root = %cfg.doc_root, "Document root is not a directory");
        }

        Ok(Self {
            listener: Arc::new(listener),
            handler: Arc::new(StaticHandler::new(PathResolver::new(cfg.doc_root.clone()))),
            limits: ConnectionLimits::from(cfg),
            workers: cfg.workers.max(1),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts the workers and waits on them.
    ///
    /// Workers only stop by panicking, so returning at all is an error.
    pub async fn run(self) -> anyhow::Result<()> {
        info!(
            addr = %self.local_addr()?,
            workers = self.workers,
            doc_root = %self.handler.resolver().doc_root(),
            "Listening"
        );

        let mut set = JoinSet::new();
        for id in 0..self.workers {
            let listener = Arc::clone(&self.listener);
            let handler = Arc::clone(&self.handler);
            let limits = self.limits;
            set.spawn(accept_loop(id, listener, handler, limits));
        }

        wait_for_workers(set).await
    }
}

/// Drains the worker set. Always an error, since only panics end a worker.
async fn wait_for_workers(mut set: JoinSet<()>) -> anyhow::Result<()> {
    let mut stopped = 0;
    while let Some(joined) = set.join_next().await {
        stopped += 1;
        if let Err(e) = joined {
            tracing::error!(error = %e, "Worker stopped");
        }
    }

    Err(anyhow::anyhow!("all {stopped} workers stopped"))
}

async fn bind_with_retry(
    addr: &str,
    attempts: u32,
    delay: Duration,
) -> std::io::Result<TcpListener> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    addr,
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "Bind failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One worker: accept a connection, serve it to completion, repeat.
async fn accept_loop(
    id: usize,
    listener: Arc<TcpListener>,
    handler: Arc<StaticHandler>,
    limits: ConnectionLimits,
) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(worker = id, error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        let span = tracing::info_span!("conn", worker = id, %peer);
        async {
            tracing::debug!("Accepted connection");
            let mut conn = Connection::new(socket, Arc::clone(&handler), limits);
            if let Err(e) = conn.run().await {
                tracing::warn!(error = %e, "Connection error");
            }
        }
        .instrument(span)
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn losing_every_worker_is_an_error() {
        let mut set = JoinSet::new();
        for id in 0..3 {
            set.spawn(async move { panic!("worker {id} failed") });
        }

        let err = wait_for_workers(set).await.unwrap_err();
        assert_eq!(err.to_string(), "all 3 workers stopped");
    }
}
