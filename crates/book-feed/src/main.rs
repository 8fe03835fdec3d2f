//! Market data feed processor.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use book_core::Stats;
use book_feed::config::Config;
use book_feed::runner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    info!(
        adapter = ?config.adapter,
        format = ?config.format,
        storage = %config.storage,
        publisher = ?config.publisher,
        "starting book-feed"
    );

    let stats = Arc::new(Stats::new());
    let mut adapter = runner::build_adapter(&config)?;
    let publisher = runner::build_publisher(&config)?;

    let stop = adapter.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping adapter");
            stop.stop();
        }
    });

    let run_stats = Arc::clone(&stats);
    let report = tokio::task::spawn_blocking(move || {
        runner::run(&config, adapter.as_mut(), publisher, run_stats)
    })
    .await
    .context("ingestion task panicked")??;

    info!(
        messages = report.messages,
        rejected = report.rejected,
        published = report.published,
        elapsed = ?report.elapsed,
        ns_per_message = %report.nanos_per_message(),
        "run complete"
    );
    eprintln!("{report}");
    eprint!("{stats}");

    Ok(())
}
