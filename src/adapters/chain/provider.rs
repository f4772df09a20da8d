//! Ledger RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the JSON-RPC connection to the chain hosting the Zora
//! marketplace. Validates connectivity and chain id at startup and
//! exposes a shared provider instance for all contract reads.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_http()` returns a concrete
//! HTTP provider. We box its transport and store it as a type-erased
//! `dyn Provider` to keep the API clean across the adapter layer.

use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::ChainConfig;

/// Shared RPC provider backed by alloy-rs 0.9.
pub struct LedgerProvider {
    /// The alloy HTTP provider (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Chain id confirmed at connect time.
    chain_id: u64,
}

impl LedgerProvider {
    /// Connect to the RPC endpoint and validate the chain id.
    #[instrument(skip_all)]
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let url = config.rpc_url.parse().context("Invalid RPC URL")?;

        let provider = ProviderBuilder::new().on_http(url).boxed();
        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        anyhow::ensure!(
            chain_id == config.chain_id,
            "Expected chain_id={}, RPC reports {chain_id}",
            config.chain_id
        );

        info!(chain_id, "Connected to ledger RPC");

        Ok(Self { provider, chain_id })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}
