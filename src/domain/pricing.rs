//! Best-price aggregation across fixed-price listings and auctions.
//!
//! Pure and synchronous: malformed facts are rejected by the inspectors
//! before they get here, so every input has a defined answer.
//!
//! Precedence:
//! 1. Nothing for sale → unavailable.
//! 2. Listing only → listing price.
//! 3. Auction only → effective auction price (max of highest bid, reserve).
//! 4. Both → the cheaper one. Fixed price wins an exact tie since it can
//!    be bought immediately.

use super::sale::{AuctionFact, BestPriceResult, ListingFact};

/// Resolve the single best price for an item from its two sale facts.
///
/// `auction.active` is deliberately ignored: an ended auction still has
/// a determinate last price. Callers that need "can I still bid" read
/// the flag from the fact itself.
pub fn resolve_best_price(listing: &ListingFact, auction: &AuctionFact) -> BestPriceResult {
    match (listing.exists, auction.exists) {
        (false, false) => BestPriceResult::unavailable(),
        (true, false) => BestPriceResult::fixed(listing.price),
        (false, true) => BestPriceResult::auction(auction.effective_price()),
        (true, true) => {
            let auction_price = auction.effective_price();
            if auction_price < listing.price {
                BestPriceResult::auction(auction_price)
            } else {
                BestPriceResult::fixed(listing.price)
            }
        }
    }
}

/// Whether either sale mechanism has a record for the item.
///
/// Independent of `active` and of any price value.
pub const fn is_for_sale(listing: &ListingFact, auction: &AuctionFact) -> bool {
    listing.exists || auction.exists
}
