//! Binary entry point: load config, connect, run the loop until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use index_warden::{ClusterClient, HttpCluster, Warden, WardenConfig};

#[derive(Parser, Debug)]
#[command(
    name = "index-warden",
    about = "Keeps search-cluster index aliases under a configured disk-size budget"
)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "./config.yaml")]
    config: PathBuf,

    /// Compute and log eviction decisions without deleting anything.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    let config = WardenConfig::load(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;
    config.validate().context("validating configuration")?;

    let cluster = HttpCluster::new(&config.cluster).context("building cluster client")?;
    cluster.ping().await.context("cluster is unreachable")?;

    let client: Arc<dyn ClusterClient> = Arc::new(cluster);
    let warden = Warden::new(&config, client, args.dry_run)?;

    if args.dry_run {
        info!("dry-run mode enabled, no indices will be deleted");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    warden.run(shutdown_rx).await;
    info!("index-warden stopped");
    Ok(())
}
