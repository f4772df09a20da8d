//! Ledger Query Port - Read-only Marketplace State Interface
//!
//! Defines the trait the resolver needs from whatever serves raw
//! marketplace facts (in production, `eth_call`s against the price
//! fetcher contract). Records come back exactly as the ledger reports
//! them; normalization is the inspectors' job.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::sale::{BestPriceResult, ItemIdentity};

/// Failure to obtain usable facts from the ledger.
///
/// "Not for sale" is never a `LookupError`; it is a successful record
/// with `exists == false`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Transport failed and retries are exhausted.
    #[error("ledger unreachable: {reason}")]
    Unreachable { reason: String },
    /// The final attempt did not answer in time.
    #[error("ledger query timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
    /// The ledger rejected the call or answered with unusable data.
    #[error("malformed ledger data in `{field}`: {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl LookupError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            reason: reason.into(),
        }
    }

    /// Short label for metrics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::Timeout { .. } => "timeout",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// Raw fixed-price listing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingRecord {
    pub exists: bool,
    pub price: U256,
    pub seller: Address,
}

/// Raw auction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuctionRecord {
    pub exists: bool,
    pub reserve_price: U256,
    pub highest_bid: U256,
    pub highest_bidder: Address,
    /// Unix seconds as stored on-chain (uint256).
    pub end_time: U256,
    pub active: bool,
}

/// Trait for read-only marketplace queries keyed by item.
///
/// Timeouts, retries and cancellation belong to implementors.
#[async_trait]
pub trait LedgerQuery: Send + Sync + 'static {
    /// Fetch the fixed-price listing row for an item.
    async fn query_listing(&self, item: &ItemIdentity) -> Result<ListingRecord, LookupError>;

    /// Fetch the auction row for an item.
    async fn query_auction(&self, item: &ItemIdentity) -> Result<AuctionRecord, LookupError>;

    /// Cheap probe: does either a listing or an auction exist?
    async fn query_exists(&self, item: &ItemIdentity) -> Result<bool, LookupError>;

    /// The ledger's own best-price answer, used for parity checks only.
    async fn query_best_price(&self, item: &ItemIdentity) -> Result<BestPriceResult, LookupError>;

    /// Check if the ledger connection is healthy.
    async fn is_healthy(&self) -> bool;
}
