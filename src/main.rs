use clap::Parser;
use tracing_subscriber::EnvFilter;

use docserve::config::Cli;
use docserve::server::Server;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Cli::parse().into_config()?;

    // One runtime thread per worker.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.workers)
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let server = Server::bind(&cfg).await?;

        tokio::select! {
            res = server.run() => {
                res?;
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}
