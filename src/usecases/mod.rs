//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces. Each use case is a
//! self-contained read operation over the ledger.
//!
//! Use cases:
//! - `ListingInspector`: Normalized fixed-price listing facts
//! - `AuctionInspector`: Normalized auction facts
//! - `PriceResolver`: Existence probe, concurrent fetch, best price
//! - `PriceMonitor`: Periodic re-quoting of watched items

pub mod auction_inspector;
pub mod listing_inspector;
pub mod monitor;
pub mod price_resolver;

pub use auction_inspector::AuctionInspector;
pub use listing_inspector::ListingInspector;
pub use monitor::{PriceMonitor, QuoteOutcome, WatchedItem};
pub use price_resolver::PriceResolver;
