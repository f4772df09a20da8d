//! JSON Renderer - Machine-readable Quotes
//!
//! Amounts are emitted as decimal wei strings so no consumer loses
//! precision to floating point.

use serde::Serialize;

use crate::domain::sale::PriceQuote;

#[derive(Debug, Serialize)]
struct QuoteView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    collection: String,
    token_id: String,
    listed: bool,
    listing: ListingView,
    auction: AuctionView,
    best_price: BestPriceView,
}

#[derive(Debug, Serialize)]
struct ListingView {
    exists: bool,
    price_wei: String,
    seller: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuctionView {
    exists: bool,
    reserve_price_wei: String,
    highest_bid_wei: String,
    highest_bidder: Option<String>,
    end_time: u64,
    active: bool,
}

#[derive(Debug, Serialize)]
struct BestPriceView {
    available: bool,
    price_wei: String,
    is_auction: bool,
}

/// Render a quote as a single-line JSON object.
pub fn render_json(label: Option<&str>, quote: &PriceQuote) -> serde_json::Result<String> {
    let view = QuoteView {
        label,
        collection: quote.item.collection.to_checksum(None),
        token_id: quote.item.token_id.to_string(),
        listed: quote.listed,
        listing: ListingView {
            exists: quote.listing.exists,
            price_wei: quote.listing.price.to_string(),
            seller: quote.listing.seller.map(|a| a.to_checksum(None)),
        },
        auction: AuctionView {
            exists: quote.auction.exists,
            reserve_price_wei: quote.auction.reserve_price.to_string(),
            highest_bid_wei: quote.auction.highest_bid.to_string(),
            highest_bidder: quote.auction.highest_bidder.map(|a| a.to_checksum(None)),
            end_time: quote.auction.end_time,
            active: quote.auction.active,
        },
        best_price: BestPriceView {
            available: quote.best.available,
            price_wei: quote.best.best_price.to_string(),
            is_auction: quote.best.is_auction,
        },
    };

    serde_json::to_string(&view)
}
