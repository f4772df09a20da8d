//! Auction Inspector - Timed Auction Facts
//!
//! Fetches the raw auction row for an item via the `LedgerQuery` port
//! and normalizes it into an `AuctionFact`. `end_time == 0` (not yet
//! started) is kept as-is; rendering it is the presentation layer's call.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::sale::{AuctionFact, ItemIdentity};
use crate::ports::ledger::{AuctionRecord, LedgerQuery, LookupError};

/// Reads auction state for one item at a time.
pub struct AuctionInspector<L: LedgerQuery> {
  ledger: Arc<L>,
}

impl<L: LedgerQuery> AuctionInspector<L> {
  pub fn new(ledger: Arc<L>) -> Self {
    Self { ledger }
  }

  /// Get the normalized auction fact for an item.
  #[instrument(skip(self, item), fields(item = %item))]
  pub async fn get_auction(&self, item: &ItemIdentity) -> Result<AuctionFact, LookupError> {
    let record = self.ledger.query_auction(item).await?;
    let fact = normalize_auction(record)?;

    debug!(
      exists = fact.exists,
      active = fact.active,
      reserve = %fact.reserve_price,
      highest_bid = %fact.highest_bid,
      end_time = fact.end_time,
      "Auction inspected"
    );
    Ok(fact)
  }
}

/// Turn a raw auction row into a fact, rejecting inconsistent rows.
pub fn normalize_auction(record: AuctionRecord) -> Result<AuctionFact, LookupError> {
  if !record.exists {
    return Ok(AuctionFact::absent());
  }

  let end_time = u64::try_from(record.end_time).map_err(|_| {
    LookupError::malformed(
      "auction.end_time",
      format!("{} does not fit a unix timestamp", record.end_time),
    )
  })?;

  let highest_bidder = if record.highest_bid.is_zero() {
    None
  } else if record.highest_bidder.is_zero() {
    return Err(LookupError::malformed(
      "auction.highest_bidder",
      format!("bid of {} wei has no bidder", record.highest_bid),
    ));
  } else {
    Some(record.highest_bidder)
  };

  Ok(AuctionFact {
    exists: true,
    reserve_price: record.reserve_price,
    highest_bid: record.highest_bid,
    highest_bidder,
    end_time,
    active: record.active,
  })
}
