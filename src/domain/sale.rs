//! Sale-state domain types.
//!
//! Normalized facts about one NFT's fixed-price listing and auction,
//! plus the single resolved best-price answer built from them.
//! Amounts are always in the smallest currency unit (wei); conversion
//! to display units happens only in the presentation adapter.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing an item identity from user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid collection address {0:?}")]
    InvalidCollection(String),
    #[error("invalid token id {0:?}")]
    InvalidTokenId(String),
}

/// A single NFT: the collection contract plus the token id within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemIdentity {
    /// ERC-721 collection contract.
    pub collection: Address,
    /// Token id inside the collection.
    pub token_id: U256,
}

impl ItemIdentity {
    pub const fn new(collection: Address, token_id: U256) -> Self {
        Self {
            collection,
            token_id,
        }
    }

    /// Parse an identity from a hex address and a decimal or `0x` hex token id.
    pub fn parse(collection: &str, token_id: &str) -> Result<Self, IdentityError> {
        let collection = Address::from_str(collection.trim())
            .map_err(|_| IdentityError::InvalidCollection(collection.to_string()))?;
        let token_id = U256::from_str(token_id.trim())
            .map_err(|_| IdentityError::InvalidTokenId(token_id.to_string()))?;

        Ok(Self::new(collection, token_id))
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.collection, self.token_id)
    }
}

/// Fixed-price sale state for one item.
///
/// `price` and `seller` only carry meaning when `exists` is true;
/// otherwise they are zero and `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListingFact {
    pub exists: bool,
    /// Asking price in wei.
    pub price: U256,
    pub seller: Option<Address>,
}

impl ListingFact {
    /// The fact reported when no fixed-price listing exists.
    pub const fn absent() -> Self {
        Self {
            exists: false,
            price: U256::ZERO,
            seller: None,
        }
    }

    pub const fn listed(price: U256, seller: Address) -> Self {
        Self {
            exists: true,
            price,
            seller: Some(seller),
        }
    }
}

/// Auction state for one item.
///
/// `exists` and `active` are independent: a concluded or cancelled
/// auction still exists and still has a last known price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuctionFact {
    pub exists: bool,
    /// Minimum acceptable winning bid in wei.
    pub reserve_price: U256,
    /// Current highest bid in wei, zero when nobody has bid.
    pub highest_bid: U256,
    pub highest_bidder: Option<Address>,
    /// Unix seconds. Zero means the auction has not started.
    pub end_time: u64,
    pub active: bool,
}

impl AuctionFact {
    /// The fact reported when no auction exists.
    pub const fn absent() -> Self {
        Self {
            exists: false,
            reserve_price: U256::ZERO,
            highest_bid: U256::ZERO,
            highest_bidder: None,
            end_time: 0,
            active: false,
        }
    }

    /// Whether the auction has been scheduled (`end_time` is set).
    pub const fn has_started(&self) -> bool {
        self.end_time != 0
    }

    /// Price a buyer must currently clear: the highest bid, floored at reserve.
    pub fn effective_price(&self) -> U256 {
        self.highest_bid.max(self.reserve_price)
    }
}

/// The single resolved price answer for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestPriceResult {
    pub available: bool,
    /// Best price in wei, zero when unavailable.
    pub best_price: U256,
    /// True when the auction supplied the best price.
    pub is_auction: bool,
}

impl BestPriceResult {
    pub const fn unavailable() -> Self {
        Self {
            available: false,
            best_price: U256::ZERO,
            is_auction: false,
        }
    }

    pub const fn fixed(price: U256) -> Self {
        Self {
            available: true,
            best_price: price,
            is_auction: false,
        }
    }

    pub const fn auction(price: U256) -> Self {
        Self {
            available: true,
            best_price: price,
            is_auction: true,
        }
    }
}

/// Everything known about one item after a quote: handed to presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub item: ItemIdentity,
    /// Result of the cheap existence probe.
    pub listed: bool,
    pub listing: ListingFact,
    pub auction: AuctionFact,
    pub best: BestPriceResult,
}

impl PriceQuote {
    /// Quote for an item the existence probe reported as not for sale.
    pub const fn unlisted(item: ItemIdentity) -> Self {
        Self {
            item,
            listed: false,
            listing: ListingFact::absent(),
            auction: AuctionFact::absent(),
            best: BestPriceResult::unavailable(),
        }
    }
}
