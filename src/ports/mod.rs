//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LedgerQuery`: Read-only listing/auction facts per NFT

pub mod ledger;

pub use ledger::{AuctionRecord, LedgerQuery, ListingRecord, LookupError};
