//! Prometheus Metrics Registry - Resolver Observability
//!
//! Registers and exposes Prometheus metrics for watch mode: quote
//! outcomes, lookup errors by kind, latency, last best price per item,
//! on-chain parity mismatches and ledger health.

use std::sync::Arc;

use alloy::primitives::U256;
use alloy::primitives::utils::format_ether;
use axum::Router;
use axum::routing::get;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::usecases::monitor::QuoteOutcome;

/// Centralized Prometheus metrics for the resolver.
///
/// All metrics follow the naming convention `zora_resolver_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Quotes by outcome (available, unavailable, error).
    pub quotes: IntCounterVec,
    /// Lookup errors by kind.
    pub lookup_errors: IntCounterVec,
    /// End-to-end quote latency (milliseconds).
    pub quote_latency_ms: HistogramVec,
    /// Last resolved best price per item, in ETH.
    pub best_price_eth: GaugeVec,
    /// Quotes that disagreed with on-chain `getBestPrice`.
    pub parity_mismatches: IntCounterVec,
    /// Ledger RPC health (1 = healthy).
    pub ledger_healthy: prometheus::Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let quotes = IntCounterVec::new(
            Opts::new("zora_resolver_quotes_total", "Quotes by outcome"),
            &["outcome"],
        )?;

        let lookup_errors = IntCounterVec::new(
            Opts::new(
                "zora_resolver_lookup_errors_total",
                "Ledger lookup errors by kind",
            ),
            &["kind"],
        )?;

        let quote_latency_ms = HistogramVec::new(
            HistogramOpts::new(
                "zora_resolver_quote_latency_ms",
                "Quote latency in milliseconds",
            )
            .buckets(vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]),
            &["item"],
        )?;

        let best_price_eth = GaugeVec::new(
            Opts::new(
                "zora_resolver_best_price_eth",
                "Last resolved best price in ETH (0 when unavailable)",
            ),
            &["item", "mechanism"],
        )?;

        let parity_mismatches = IntCounterVec::new(
            Opts::new(
                "zora_resolver_parity_mismatches_total",
                "Quotes diverging from on-chain getBestPrice",
            ),
            &["item"],
        )?;

        let ledger_healthy = prometheus::Gauge::new(
            "zora_resolver_ledger_healthy",
            "Ledger RPC health (1=healthy, 0=unreachable)",
        )?;

        // Register all metrics
        registry.register(Box::new(quotes.clone()))?;
        registry.register(Box::new(lookup_errors.clone()))?;
        registry.register(Box::new(quote_latency_ms.clone()))?;
        registry.register(Box::new(best_price_eth.clone()))?;
        registry.register(Box::new(parity_mismatches.clone()))?;
        registry.register(Box::new(ledger_healthy.clone()))?;

        Ok(Self {
            registry,
            quotes,
            lookup_errors,
            quote_latency_ms,
            best_price_eth,
            parity_mismatches,
            ledger_healthy,
        })
    }

    /// Record one monitor cycle.
    pub fn record_outcomes(&self, outcomes: &[QuoteOutcome]) {
        for outcome in outcomes {
            self.quote_latency_ms
                .with_label_values(&[outcome.label.as_str()])
                .observe(outcome.latency.as_secs_f64() * 1000.0);

            match &outcome.result {
                Ok(quote) => {
                    let best = quote.best;
                    let (result, mechanism) = match (best.available, best.is_auction) {
                        (false, _) => ("unavailable", "none"),
                        (true, false) => ("available", "fixed"),
                        (true, true) => ("available", "auction"),
                    };
                    self.quotes.with_label_values(&[result]).inc();

                    // Only one mechanism series per item is live at a time.
                    for stale in ["none", "fixed", "auction"] {
                        let _ = self
                            .best_price_eth
                            .remove_label_values(&[outcome.label.as_str(), stale]);
                    }
                    self.best_price_eth
                        .with_label_values(&[outcome.label.as_str(), mechanism])
                        .set(wei_to_eth_f64(best.best_price));
                }
                Err(e) => {
                    self.quotes.with_label_values(&["error"]).inc();
                    self.lookup_errors.with_label_values(&[e.kind()]).inc();
                }
            }

            if outcome.matches_ledger == Some(false) {
                self.parity_mismatches
                    .with_label_values(&[outcome.label.as_str()])
                    .inc();
            }
        }
    }

    pub fn set_ledger_healthy(&self, healthy: bool) {
        self.ledger_healthy.set(if healthy { 1.0 } else { 0.0 });
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move { metrics.encode() }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

/// Lossy wei → ETH conversion for gauges.
fn wei_to_eth_f64(wei: U256) -> f64 {
    format_ether(wei).parse().unwrap_or(f64::NAN)
}
