//! # CLI Interface
//!
//! Command-line arguments for `tessera-node`, built with `clap` derive.
//! Every `run` flag can also be set through a `TESSERA_*` environment
//! variable.

use clap::{Parser, Subcommand};

use tessera_protocol::config::{
    BLOCK_TIME_MS, DEFAULT_METRICS_PORT, DEFAULT_RPC_PORT, MAX_VOTES_PER_VOTING_TRANSACTION,
};

use crate::logging::LogFormat;

/// Tessera ledger node.
///
/// Serves the JSON-RPC API for attachments, the asset registry and phased
/// vote casting, forges blocks on a fixed interval, and exposes Prometheus
/// metrics.
#[derive(Parser, Debug)]
#[command(
    name = "tessera-node",
    about = "Tessera ledger node",
    version,
    propagate_version = true
)]
pub struct TesseraNodeCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the node.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Port for the JSON-RPC and REST API.
    #[arg(long, env = "TESSERA_RPC_PORT", default_value_t = DEFAULT_RPC_PORT)]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "TESSERA_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// Most pending transactions one vote-casting transaction may reference.
    #[arg(
        long,
        env = "TESSERA_MAX_VOTES",
        default_value_t = MAX_VOTES_PER_VOTING_TRANSACTION,
        value_parser = clap::value_parser!(u8).range(1..)
    )]
    pub max_votes: u8,

    /// Interval between forged blocks, in milliseconds.
    #[arg(
        long,
        env = "TESSERA_BLOCK_TIME_MS",
        default_value_t = BLOCK_TIME_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub block_time_ms: u64,

    /// Log output format.
    #[arg(long, env = "TESSERA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}
