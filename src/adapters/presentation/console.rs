//! Console Renderer - Human-readable Quotes
//!
//! Converts wei to ETH and unix seconds to UTC timestamps. This is the
//! only place where display units exist.

use std::fmt::Write;

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use chrono::DateTime;

use crate::domain::sale::{AuctionFact, PriceQuote};

/// Render an amount as trimmed ETH, e.g. `1.5 ETH`.
pub fn display_eth(wei: U256) -> String {
    let formatted = format_ether(wei);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    format!("{trimmed} ETH")
}

/// Render an auction's end time, or "Not started" while it is unset.
pub fn display_end_time(auction: &AuctionFact) -> String {
    if !auction.has_started() {
        return "Not started".to_string();
    }

    let end_time = auction.end_time;
    i64::try_from(end_time)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map_or_else(
            || format!("@{end_time}"),
            |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}

fn display_address(address: Option<Address>) -> String {
    address.map_or_else(|| "none".to_string(), |a| a.to_checksum(None))
}

/// Render a full quote as an indented text block.
pub fn render_quote(label: Option<&str>, quote: &PriceQuote) -> String {
    let mut out = String::new();

    match label {
        Some(label) => {
            let _ = writeln!(out, "{label} ({})", quote.item);
        }
        None => {
            let _ = writeln!(out, "{}", quote.item);
        }
    }
    let _ = writeln!(out, "  Listed on Zora: {}", quote.listed);

    if !quote.listed {
        return out;
    }

    let listing = &quote.listing;
    let _ = writeln!(out, "  Fixed price listing:");
    let _ = writeln!(out, "    exists: {}", listing.exists);
    let _ = writeln!(
        out,
        "    price: {} ({} wei)",
        display_eth(listing.price),
        listing.price
    );
    let _ = writeln!(out, "    seller: {}", display_address(listing.seller));

    let auction = &quote.auction;
    let _ = writeln!(out, "  Auction:");
    let _ = writeln!(out, "    exists: {}", auction.exists);
    let _ = writeln!(out, "    reserve price: {}", display_eth(auction.reserve_price));
    let _ = writeln!(out, "    highest bid: {}", display_eth(auction.highest_bid));
    let _ = writeln!(out, "    highest bidder: {}", display_address(auction.highest_bidder));
    let _ = writeln!(out, "    end time: {}", display_end_time(auction));
    let _ = writeln!(out, "    active: {}", auction.active);

    let best = &quote.best;
    let _ = writeln!(out, "  Best price:");
    let _ = writeln!(out, "    available: {}", best.available);
    let _ = writeln!(out, "    price: {}", display_eth(best.best_price));
    let _ = writeln!(out, "    is auction: {}", best.is_auction);

    out
}
