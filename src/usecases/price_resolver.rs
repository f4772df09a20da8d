//! Price Resolver - Best Price for One NFT
//!
//! Orchestrates the two inspectors and the pure aggregator:
//! 1. Cheap existence probe (`is_listed`)
//! 2. Listing and auction fetched concurrently, joined
//! 3. `resolve_best_price` over both facts
//! 4. Optional parity check against the ledger's own best price
//!
//! `LookupError` propagates unmodified; this layer never retries.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::pricing::resolve_best_price;
use crate::domain::sale::{AuctionFact, BestPriceResult, ItemIdentity, ListingFact, PriceQuote};
use crate::ports::ledger::{LedgerQuery, LookupError};

use super::auction_inspector::AuctionInspector;
use super::listing_inspector::ListingInspector;

/// Resolves sale state and best price for items on one ledger.
pub struct PriceResolver<L: LedgerQuery> {
  ledger: Arc<L>,
  listings: ListingInspector<L>,
  auctions: AuctionInspector<L>,
}

impl<L: LedgerQuery> PriceResolver<L> {
  pub fn new(ledger: Arc<L>) -> Self {
    Self {
      listings: ListingInspector::new(Arc::clone(&ledger)),
      auctions: AuctionInspector::new(Arc::clone(&ledger)),
      ledger,
    }
  }

  /// Whether the item has a listing or an auction, without fetching details.
  #[instrument(skip(self, item), fields(item = %item))]
  pub async fn is_listed(&self, item: &ItemIdentity) -> Result<bool, LookupError> {
    self.ledger.query_exists(item).await
  }

  pub async fn get_listing(&self, item: &ItemIdentity) -> Result<ListingFact, LookupError> {
    self.listings.get_listing(item).await
  }

  pub async fn get_auction(&self, item: &ItemIdentity) -> Result<AuctionFact, LookupError> {
    self.auctions.get_auction(item).await
  }

  /// Fetch both facts concurrently.
  pub async fn get_facts(
    &self,
    item: &ItemIdentity,
  ) -> Result<(ListingFact, AuctionFact), LookupError> {
    tokio::try_join!(self.listings.get_listing(item), self.auctions.get_auction(item))
  }

  /// Fetch both facts and resolve the best price.
  pub async fn best_price(&self, item: &ItemIdentity) -> Result<BestPriceResult, LookupError> {
    let (listing, auction) = self.get_facts(item).await?;
    Ok(resolve_best_price(&listing, &auction))
  }

  /// Full quote for presentation.
  ///
  /// Skips the detail fetch when the existence probe says nothing is
  /// for sale.
  #[instrument(skip(self, item), fields(item = %item))]
  pub async fn quote(&self, item: &ItemIdentity) -> Result<PriceQuote, LookupError> {
    if !self.is_listed(item).await? {
      info!("Item not listed, skipping detail fetch");
      return Ok(PriceQuote::unlisted(*item));
    }

    let (listing, auction) = self.get_facts(item).await?;
    let best = resolve_best_price(&listing, &auction);

    info!(
      available = best.available,
      best_price = %best.best_price,
      is_auction = best.is_auction,
      "Best price resolved"
    );

    Ok(PriceQuote {
      item: *item,
      listed: true,
      listing,
      auction,
      best,
    })
  }

  /// Compare a quote with the ledger's own best-price answer.
  ///
  /// Returns `true` when they agree. A disagreement is logged, not
  /// raised: the local precedence rules are authoritative.
  #[instrument(skip(self, quote), fields(item = %quote.item))]
  pub async fn verify_against_ledger(&self, quote: &PriceQuote) -> Result<bool, LookupError> {
    let reference = self.ledger.query_best_price(&quote.item).await?;

    if reference == quote.best {
      return Ok(true);
    }

    warn!(
      local_price = %quote.best.best_price,
      local_is_auction = quote.best.is_auction,
      ledger_available = reference.available,
      ledger_price = %reference.best_price,
      ledger_is_auction = reference.is_auction,
      "Best price diverges from on-chain getBestPrice"
    );
    Ok(false)
  }

  /// Check if the underlying ledger is reachable.
  pub async fn is_healthy(&self) -> bool {
    self.ledger.is_healthy().await
  }
}
