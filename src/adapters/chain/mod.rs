//! Chain Adapters - Ledger Access Layer
//!
//! Provides on-chain reads via alloy-rs 0.9 for:
//! - RPC provider management with chain id validation
//! - `ZoraNFTPriceFetcher` view calls (implements `LedgerQuery`)
//! - Startup validation of configured contract addresses

pub mod price_fetcher;
pub mod provider;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_rpc;

pub use price_fetcher::{CallPolicy, PriceFetcherContract};
pub use provider::LedgerProvider;
pub use validator::{ContractValidator, ValidationResult, missing_code};
