//! # Prometheus Metrics
//!
//! Operational metrics for the node, scraped at `/metrics` on the metrics
//! port. Everything lives in a dedicated [`prometheus::Registry`] with the
//! `tessera` prefix.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metric handles for the node. Cloning shares the underlying metrics.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Blocks forged by the ledger worker.
    pub blocks_forged_total: IntCounter,
    /// Transactions accepted by the submission pipeline.
    pub transactions_submitted_total: IntCounter,
    /// Transactions applied to the ledger, by outcome.
    pub transactions_applied_total: IntCounterVec,
    /// Vote-casting requests refused, by error code.
    pub vote_casting_rejected_total: IntCounterVec,
    /// Assets currently in the registry.
    pub registered_assets: IntGauge,
    /// Height of the latest forged block.
    pub block_height: IntGauge,
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("tessera".into()), None)?;

        let blocks_forged_total = register(
            &registry,
            IntCounter::new("blocks_forged_total", "Total number of blocks forged")?,
        )?;
        let transactions_submitted_total = register(
            &registry,
            IntCounter::new(
                "transactions_submitted_total",
                "Total number of transactions accepted for inclusion",
            )?,
        )?;
        let transactions_applied_total = register(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "transactions_applied_total",
                    "Transactions applied to the ledger, by outcome",
                ),
                &["outcome"],
            )?,
        )?;
        let vote_casting_rejected_total = register(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "vote_casting_rejected_total",
                    "Vote-casting requests rejected, by error code",
                ),
                &["code"],
            )?,
        )?;
        let registered_assets = register(
            &registry,
            IntGauge::new("registered_assets", "Number of assets in the registry")?,
        )?;
        let block_height = register(
            &registry,
            IntGauge::new("block_height", "Height of the latest forged block")?,
        )?;

        Ok(Self {
            registry,
            blocks_forged_total,
            transactions_submitted_total,
            transactions_applied_total,
            vote_casting_rejected_total,
            registered_assets,
            block_height,
        })
    }

    /// Encodes all registered metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

pub type SharedMetrics = Arc<NodeMetrics>;

/// Renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_prefix() {
        let metrics = NodeMetrics::new().unwrap();
        metrics.blocks_forged_total.inc();
        metrics
            .vote_casting_rejected_total
            .with_label_values(&["4"])
            .inc();
        let text = metrics.encode().unwrap();
        assert!(text.contains("tessera_blocks_forged_total 1"));
        assert!(text.contains("tessera_vote_casting_rejected_total{code=\"4\"} 1"));
    }
}
