//! Polls server: aggregated election poll snapshots over HTTP.
//!
//! Single-binary Tokio application that:
//! 1. Fetches the published NYT poll feed on demand
//! 2. Reduces it to one latest-poll snapshot per region
//! 3. Caches the aggregate behind a TTL with single-flight refresh
//! 4. Serves region snapshots and candidate results over HTTP

mod config;
mod http;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use aggregator::{PollQueries, SnapshotCache};
use http::ApiServer;
use nyt_client::NytPollsClient;

/// Aggregated poll snapshot server.
#[derive(Parser)]
#[command(name = "polls-server", about = "Aggregated election poll snapshot server")]
struct Cli {
    /// Fetch and aggregate once, print the snapshot as JSON, then exit.
    #[arg(long)]
    fetch_once: bool,
}

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polls_server=info,nyt_client=info,aggregator=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Polls server starting up...");

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Feed: {}", cfg.feed.url);
    info!(
        "Cache TTL: {}s, request timeout: {}s",
        cfg.cache.ttl_secs, cfg.feed.request_timeout_secs
    );

    // ── Shared state ─────────────────────────────────────────────────
    let client = NytPollsClient::new(cfg.feed.url.clone(), cfg.feed.request_timeout_secs);
    let cache = Arc::new(SnapshotCache::new(
        Arc::new(client),
        Duration::from_secs(cfg.cache.ttl_secs),
    ));
    let queries = PollQueries::new(Arc::clone(&cache));

    // ── Fetch-once mode ──────────────────────────────────────────────
    if cli.fetch_once {
        info!("Running single fetch-and-aggregate...");
        match queries.regions().await {
            Ok(aggregate) => {
                info!("Aggregated {} regions", aggregate.len());
                match serde_json::to_string_pretty(aggregate.as_ref()) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(e) => {
                        error!("Failed to render snapshot: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            Err(e) => {
                error!("Fetch failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // ── Spawn tasks ──────────────────────────────────────────────────

    // Task 1: HTTP API
    let server = ApiServer::new(
        cfg.server.bind_addr.clone(),
        queries.clone(),
        Arc::clone(&cache),
    );
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            error!("API server error: {}", e);
        }
    });

    // Task 2: Heartbeat
    let hb_cache = Arc::clone(&cache);
    let heartbeat_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let status = hb_cache.status().await;
            info!(
                "HEARTBEAT: has_data={} regions={} age_secs={:?} refreshed_at={:?}",
                status.has_data,
                status.regions,
                status.age_secs,
                status.refreshed_at.map(|t| t.to_rfc3339()),
            );
        }
    });

    // ── Wait for shutdown ────────────────────────────────────────────
    info!(
        "Polls server is running on http://{}. Press Ctrl+C to stop.",
        cfg.server.bind_addr
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = server_handle => {
            error!("API server task exited: {:?}", r);
        }
        r = heartbeat_handle => {
            error!("Heartbeat task exited: {:?}", r);
        }
    }

    info!("Polls server shut down.");
}
