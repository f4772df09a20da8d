//! Listing Inspector - Fixed-price Sale Facts
//!
//! Fetches the raw listing row for an item via the `LedgerQuery` port
//! and normalizes it into a `ListingFact`.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::sale::{ItemIdentity, ListingFact};
use crate::ports::ledger::{LedgerQuery, ListingRecord, LookupError};

/// Reads fixed-price listing state for one item at a time.
pub struct ListingInspector<L: LedgerQuery> {
  ledger: Arc<L>,
}

impl<L: LedgerQuery> ListingInspector<L> {
  pub fn new(ledger: Arc<L>) -> Self {
    Self { ledger }
  }

  /// Get the normalized listing fact for an item.
  ///
  /// A missing listing is `exists == false`, never an error.
  #[instrument(skip(self, item), fields(item = %item))]
  pub async fn get_listing(&self, item: &ItemIdentity) -> Result<ListingFact, LookupError> {
    let record = self.ledger.query_listing(item).await?;
    let fact = normalize_listing(record)?;

    debug!(exists = fact.exists, price = %fact.price, "Listing inspected");
    Ok(fact)
  }
}

/// Turn a raw listing row into a fact, rejecting inconsistent rows.
///
/// Non-existent rows are zeroed whatever the ledger left in them.
pub fn normalize_listing(record: ListingRecord) -> Result<ListingFact, LookupError> {
  if !record.exists {
    return Ok(ListingFact::absent());
  }

  if record.seller.is_zero() {
    return Err(LookupError::malformed(
      "listing.seller",
      "listing exists without a seller",
    ));
  }

  Ok(ListingFact::listed(record.price, record.seller))
}
