//! Shrine proxy - serves the weekly shrine enriched with perk metadata
//!
//! Runs either as an HTTP server with an in-memory cache and weekly background
//! refresh, or as a one-shot fetch that writes the snapshot file.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use shrine_proxy::cache::{CacheController, SnapshotFile};
use shrine_proxy::cli::{Cli, Command, ServeArgs};
use shrine_proxy::config::Config;
use shrine_proxy::data::build_http_client;
use shrine_proxy::logging::init_logging;
use shrine_proxy::pipeline::ShrinePipeline;
use shrine_proxy::refresh::{refresh_once, RefreshHandle};
use shrine_proxy::server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.config();
    let http_client = build_http_client().context("Failed to build HTTP client")?;
    let pipeline = ShrinePipeline::new(&config, http_client);

    match cli.action() {
        Command::Fetch => fetch(pipeline, &config).await,
        Command::Serve(args) => serve(pipeline, config, args).await,
    }
}

/// Runs the pipeline once and writes the snapshot file
async fn fetch(pipeline: ShrinePipeline, config: &Config) -> anyhow::Result<()> {
    let snapshot = pipeline.run().await.context("Shrine fetch failed")?;

    let file = SnapshotFile::new(&config.snapshot_file);
    file.write(&snapshot)
        .await
        .with_context(|| format!("Failed to write {}", config.snapshot_file.display()))?;

    println!(
        "Wrote {} perks from {} to {}",
        snapshot.perks_with_images.len(),
        snapshot.source_used,
        config.snapshot_file.display()
    );
    Ok(())
}

async fn serve(pipeline: ShrinePipeline, config: Config, args: ServeArgs) -> anyhow::Result<()> {
    let cache = Arc::new(CacheController::new(pipeline, config.refresh_interval).strict(args.strict));
    let snapshot_file = SnapshotFile::new(&config.snapshot_file);

    info!(
        sources = ?config.shrine_sources,
        snapshot_file = %config.snapshot_file.display(),
        strict = args.strict,
        "starting shrine proxy"
    );

    // Warm-up is best effort and must not delay serving
    {
        let cache = cache.clone();
        let snapshot_file = snapshot_file.clone();
        tokio::spawn(async move {
            if let Err(e) = refresh_once(&cache, &snapshot_file).await {
                warn!(error = %e, "initial shrine fetch failed, cache stays cold");
            }
        });
    }

    let refresh = RefreshHandle::spawn(cache.clone(), snapshot_file.clone(), config.refresh_interval);

    let app = router(AppState {
        cache,
        snapshot_file,
    });

    let addr = args.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    refresh.shutdown().await;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
