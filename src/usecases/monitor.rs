//! Price Monitor - Periodic Re-quoting of Watched Items
//!
//! Quotes every watched item once per poll interval with bounded
//! concurrency, hands each cycle's outcomes to a caller-supplied sink
//! (metrics, logs), and stops on the shutdown broadcast.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::domain::sale::{ItemIdentity, PriceQuote};
use crate::ports::ledger::{LedgerQuery, LookupError};

use super::price_resolver::PriceResolver;

/// An item under watch with its human label.
#[derive(Debug, Clone)]
pub struct WatchedItem {
  pub label: String,
  pub item: ItemIdentity,
}

/// Result of quoting one item in one cycle.
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
  pub label: String,
  pub item: ItemIdentity,
  pub result: Result<PriceQuote, LookupError>,
  /// `None` when the parity check is disabled, skipped, or failed.
  pub matches_ledger: Option<bool>,
  pub latency: Duration,
}

/// Watches a fixed set of items.
pub struct PriceMonitor<L: LedgerQuery> {
  resolver: Arc<PriceResolver<L>>,
  items: Vec<WatchedItem>,
  poll_interval: Duration,
  max_concurrent: usize,
  verify_onchain: bool,
}

impl<L: LedgerQuery> PriceMonitor<L> {
  pub fn new(
    resolver: Arc<PriceResolver<L>>,
    items: Vec<WatchedItem>,
    poll_interval: Duration,
    max_concurrent: usize,
  ) -> Self {
    Self {
      resolver,
      items,
      poll_interval,
      max_concurrent: max_concurrent.max(1),
      verify_onchain: false,
    }
  }

  /// Also compare every quote with the ledger's own best price.
  #[must_use]
  pub const fn with_onchain_verification(mut self, enabled: bool) -> Self {
    self.verify_onchain = enabled;
    self
  }

  /// Quote every watched item once.
  ///
  /// Outcomes come back in completion order, not configuration order.
  pub async fn run_cycle(&self) -> Vec<QuoteOutcome> {
    stream::iter(self.items.clone())
      .map(|watched| self.quote_one(watched))
      .buffer_unordered(self.max_concurrent)
      .collect()
      .await
  }

  async fn quote_one(&self, watched: WatchedItem) -> QuoteOutcome {
    let started = Instant::now();
    let result = self.resolver.quote(&watched.item).await;

    let matches_ledger = match (&result, self.verify_onchain) {
      (Ok(quote), true) if quote.listed => {
        match self.resolver.verify_against_ledger(quote).await {
          Ok(agrees) => Some(agrees),
          Err(e) => {
            warn!(label = %watched.label, error = %e, "Parity check failed");
            None
          }
        }
      }
      _ => None,
    };

    if let Err(e) = &result {
      warn!(label = %watched.label, item = %watched.item, error = %e, "Quote failed");
    }

    QuoteOutcome {
      label: watched.label,
      item: watched.item,
      result,
      matches_ledger,
      latency: started.elapsed(),
    }
  }

  /// Run cycles until shutdown.
  ///
  /// The first cycle starts immediately; `on_cycle` sees every cycle's
  /// outcomes.
  #[instrument(skip_all, name = "price_monitor")]
  pub async fn run<F>(&self, mut shutdown_rx: broadcast::Receiver<()>, mut on_cycle: F)
  where
    F: FnMut(&[QuoteOutcome]) + Send,
  {
    info!(
      items = self.items.len(),
      interval_secs = self.poll_interval.as_secs(),
      max_concurrent = self.max_concurrent,
      "Price monitor started"
    );

    let mut ticker = tokio::time::interval(self.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Price monitor received shutdown signal");
          break;
        }
        _ = ticker.tick() => {
          let outcomes = self.run_cycle().await;
          let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
          info!(quoted = outcomes.len(), failed, "Monitor cycle complete");
          on_cycle(&outcomes);
        }
      }
    }

    info!("Price monitor stopped cleanly");
  }
}
