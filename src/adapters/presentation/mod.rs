//! Presentation Adapters - Rendering Resolved Quotes
//!
//! Turns `PriceQuote`s into console text or JSON. Unit conversion
//! (wei → ETH) and timestamp formatting live here and nowhere else.

pub mod console;
pub mod json;

pub use console::render_quote;
pub use json::render_json;
