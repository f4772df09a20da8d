//! Domain layer - Sale-state types and price resolution.
//!
//! Pure logic only: no I/O, no async. Everything here is
//! serializable and testable in isolation.

pub mod pricing;
pub mod sale;

// Re-export core types for convenience
pub use pricing::{is_for_sale, resolve_best_price};
pub use sale::{
    AuctionFact, BestPriceResult, IdentityError, ItemIdentity, ListingFact, PriceQuote,
};
