//! # Tessera Node
//!
//! Entry point for the `tessera-node` binary. Parses CLI arguments,
//! initializes logging and metrics, starts the ledger worker, and serves the
//! HTTP API.
//!
//! - `run`    : start the node
//! - `version`: print build version information

mod api;
mod cli;
mod ledger;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use tessera_protocol::asset::AssetRegistry;
use tessera_protocol::ledger::{LedgerApplier, MemoryChain};

use cli::{Commands, TesseraNodeCli};
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TesseraNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the node: ledger worker, API server and metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, args.log_format)
        .context("failed to initialize logging")?;

    tracing::info!(
        rpc_port = args.rpc_port,
        metrics_port = args.metrics_port,
        max_votes = args.max_votes,
        block_time_ms = args.block_time_ms,
        "starting tessera-node"
    );

    let node_metrics = Arc::new(NodeMetrics::new().context("failed to create metrics registry")?);

    // --- Ledger ---
    let chain = Arc::new(MemoryChain::new());
    let (assets, writer) = AssetRegistry::new();
    let (submitter, worker) = ledger::channel(
        Arc::clone(&chain),
        LedgerApplier::new(writer),
        Arc::clone(&node_metrics),
    );

    let app_state = api::AppState::new(
        format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            tessera_protocol::config::PROTOCOL_VERSION,
        ),
        chain,
        assets,
        Arc::new(submitter),
        args.max_votes,
        Arc::clone(&node_metrics),
    );

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.rpc_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind RPC listener on {}", api_addr))?;
    tracing::info!("RPC/API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Block forging ---
    let block_loop = tokio::spawn(worker.run(Duration::from_millis(args.block_time_ms)));

    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    block_loop.abort();
    tracing::info!("tessera-node stopped");
    Ok(())
}

fn print_version() {
    println!("tessera-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol     {}", tessera_protocol::config::PROTOCOL_VERSION);
    println!(
        "max votes    {}",
        tessera_protocol::config::MAX_VOTES_PER_VOTING_TRANSACTION
    );
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
