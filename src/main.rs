//! Zora Price Resolver — Entry Point
//!
//! Wiring sequence:
//! 1. Parse CLI, load config.toml + validate
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Connect to the ledger RPC (chain id check)
//! 4. Validate the price fetcher and the collections about to be quoted
//! 5. Build the `PriceFetcherContract` adapter and `PriceResolver`
//! 6. `quote`: resolve each item once and print it
//!    `watch`: spawn health + metrics servers and the `PriceMonitor`,
//!    run until SIGINT, then shut down gracefully

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use futures_util::stream;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use zora_price_resolver::adapters::chain::{
    CallPolicy, ContractValidator, LedgerProvider, PriceFetcherContract, missing_code,
};
use zora_price_resolver::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use zora_price_resolver::adapters::presentation::{render_json, render_quote};
use zora_price_resolver::config::{self, AppConfig};
use zora_price_resolver::domain::ItemIdentity;
use zora_price_resolver::usecases::{PriceMonitor, PriceResolver, WatchedItem};

type Resolver = PriceResolver<PriceFetcherContract>;

#[derive(Parser, Debug)]
#[command(name = "zora-price-resolver")]
#[command(about = "Resolve the best sale price of NFTs listed on Zora")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Quote items once and print the result
    Quote {
        /// Collection address (overrides configured items, needs --token-id)
        #[arg(long, requires = "token_id")]
        collection: Option<String>,
        /// Token id, decimal or 0x hex
        #[arg(long, requires = "collection")]
        token_id: Option<String>,
        /// Print one JSON object per item instead of text
        #[arg(long)]
        json: bool,
    },
    /// Re-quote configured items periodically and export metrics
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_config(&cli.config)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.resolver.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        name = %config.resolver.name,
        version = env!("CARGO_PKG_VERSION"),
        items = config.items.len(),
        "Starting Zora price resolver"
    );

    // ── 3. Connect to ledger RPC ────────────────────────────
    let provider = Arc::new(
        LedgerProvider::connect(&config.chain)
            .await
            .context("Failed to connect to ledger RPC")?,
    );

    // ── 4. Validate contracts on-chain ──────────────────────
    let configured = configured_items(&config)?;
    let items = match &cli.command {
        Commands::Quote {
            collection,
            token_id,
            ..
        } => select_items(collection.as_deref(), token_id.as_deref(), configured)?,
        Commands::Watch => configured,
    };
    let collections: Vec<_> = items
        .iter()
        .map(|w| (display_label(w), w.item.collection))
        .collect();
    let results = ContractValidator::new(provider.inner())
        .validate_all(config.chain.price_fetcher, &collections)
        .await
        .context("Contract validation failed")?;

    let missing = missing_code(&results);
    if !missing.is_empty() {
        warn!(
            ?missing,
            validated = results.len(),
            "Collections without code will never report a sale"
        );
    }

    // ── 5. Resolver over the price fetcher contract ─────────
    let ledger = Arc::new(PriceFetcherContract::new(
        Arc::clone(&provider),
        config.chain.price_fetcher,
        CallPolicy::from(&config.chain),
    ));
    info!(
        chain_id = provider.chain_id(),
        price_fetcher = %ledger.address(),
        items = items.len(),
        "Resolver ready"
    );
    let resolver = Arc::new(PriceResolver::new(ledger));

    match cli.command {
        Commands::Quote { json, .. } => run_quotes(&config, &resolver, items, json).await,
        Commands::Watch => run_watch(config, resolver, items).await,
    }
}

/// Parse configured items into watched identities.
fn configured_items(config: &AppConfig) -> Result<Vec<WatchedItem>> {
    config
        .items
        .iter()
        .map(|item| {
            Ok(WatchedItem {
                label: item.label.clone(),
                item: item
                    .identity()
                    .with_context(|| format!("Invalid item {}", item.label))?,
            })
        })
        .collect()
}

/// Items to quote: the command-line identity when given, else the configured ones.
fn select_items(
    collection: Option<&str>,
    token_id: Option<&str>,
    configured: Vec<WatchedItem>,
) -> Result<Vec<WatchedItem>> {
    match (collection, token_id) {
        (Some(collection), Some(token_id)) => Ok(vec![WatchedItem {
            label: String::new(),
            item: ItemIdentity::parse(collection, token_id)
                .context("Invalid item on command line")?,
        }]),
        (None, None) => Ok(configured),
        _ => anyhow::bail!("--collection and --token-id must be given together"),
    }
}

/// Name used for an item in validation logs.
fn display_label(watched: &WatchedItem) -> String {
    if watched.label.is_empty() {
        watched.item.to_string()
    } else {
        watched.label.clone()
    }
}

/// Quote every item once, print in input order, fail if any lookup failed.
async fn run_quotes(
    config: &AppConfig,
    resolver: &Resolver,
    items: Vec<WatchedItem>,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(
        !items.is_empty(),
        "No items to quote: configure [[items]] or pass --collection/--token-id"
    );

    let results: Vec<_> = stream::iter(items.iter())
        .map(|w| async move { (w, resolver.quote(&w.item).await) })
        .buffered(config.watch.max_concurrent_queries)
        .collect()
        .await;

    let mut failed = 0usize;
    for (watched, result) in &results {
        let label = (!watched.label.is_empty()).then_some(watched.label.as_str());

        match result {
            Ok(quote) => {
                if json {
                    println!("{}", render_json(label, quote)?);
                } else {
                    print!("{}", render_quote(label, quote));
                }

                if config.chain.verify_onchain_best_price && quote.listed {
                    if let Err(e) = resolver.verify_against_ledger(quote).await {
                        warn!(item = %watched.item, error = %e, "Parity check failed");
                    }
                }
            }
            Err(e) => {
                failed += 1;
                error!(item = %watched.item, error = %e, "Quote failed");
            }
        }
    }

    anyhow::ensure!(failed == 0, "{failed} of {} quotes failed", results.len());
    Ok(())
}

/// Run the monitor with health and metrics servers until SIGINT.
async fn run_watch(
    config: AppConfig,
    resolver: Arc<Resolver>,
    watched: Vec<WatchedItem>,
) -> Result<()> {
    anyhow::ensure!(!watched.is_empty(), "Watch mode needs at least one [[items]] entry");

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let poll_interval = Duration::from_secs(config.watch.poll_interval_seconds);

    let health = Arc::new(HealthState::new());
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?);

    // ── Health server ───────────────────────────────────────
    let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
    let health_handle = tokio::spawn(health_server.run(shutdown_tx.subscribe()));

    // ── Prometheus metrics server ───────────────────────────
    let metrics_handle = if config.metrics.enabled {
        let bind = config.metrics.bind_address.clone();
        Some(tokio::spawn(Arc::clone(&metrics).serve(bind, shutdown_tx.subscribe())))
    } else {
        None
    };

    // ── Ledger health probe ─────────────────────────────────
    let probe_resolver = Arc::clone(&resolver);
    let probe_health = Arc::clone(&health);
    let probe_metrics = Arc::clone(&metrics);
    let mut probe_shutdown = shutdown_tx.subscribe();
    let probe_handle = tokio::spawn(async move {
        loop {
            let healthy = probe_resolver.is_healthy().await;
            if !healthy {
                warn!("Ledger RPC health probe failed");
            }
            probe_health.set_ledger_healthy(healthy);
            probe_metrics.set_ledger_healthy(healthy);

            tokio::select! {
                biased;
                _ = probe_shutdown.recv() => break,
                () = tokio::time::sleep(poll_interval) => {}
            }
        }
    });

    // ── Price monitor ───────────────────────────────────────
    let monitor = PriceMonitor::new(
        Arc::clone(&resolver),
        watched,
        poll_interval,
        config.watch.max_concurrent_queries,
    )
    .with_onchain_verification(config.chain.verify_onchain_best_price);
    let monitor_metrics = Arc::clone(&metrics);
    let monitor_shutdown = shutdown_tx.subscribe();
    let monitor_handle = tokio::spawn(async move {
        monitor
            .run(monitor_shutdown, |outcomes| monitor_metrics.record_outcomes(outcomes))
            .await;
    });

    info!("All tasks spawned — resolver is watching");

    // ── Wait for SIGINT ─────────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    health.set_monitor_running(false);
    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(Duration::from_secs(30), monitor_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), probe_handle).await;

    match tokio::time::timeout(Duration::from_secs(5), health_handle).await {
        Ok(Ok(Err(e))) => warn!(error = %e, "Health server exited with error"),
        Err(_) => warn!("Health server did not stop in time"),
        _ => {}
    }
    if let Some(handle) = metrics_handle {
        match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(Ok(Err(e))) => warn!(error = %e, "Metrics server exited with error"),
            Err(_) => warn!("Metrics server did not stop in time"),
            _ => {}
        }
    }

    info!("Shutdown complete");
    Ok(())
}
