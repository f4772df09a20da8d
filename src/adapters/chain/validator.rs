//! Contract Validator — On-chain Verification at Startup
//!
//! Checks that configured addresses point at deployed contracts:
//! the price fetcher is critical (hard failure), collections only
//! produce a warning since a typo there affects a single item.

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

/// Result of validating a single contract.
#[derive(Debug)]
pub struct ValidationResult {
    /// Contract name for logging.
    pub name: String,
    /// Address that was validated.
    pub address: Address,
    /// Whether the contract has deployed code.
    pub has_code: bool,
}

/// Names of validated contracts with no deployed code.
pub fn missing_code(results: &[ValidationResult]) -> Vec<&str> {
    results
        .iter()
        .filter(|r| !r.has_code)
        .map(|r| r.name.as_str())
        .collect()
}

/// Validates contract addresses against on-chain state.
pub struct ContractValidator {
    /// Alloy provider for on-chain queries.
    provider: Arc<dyn Provider + Send + Sync>,
}

impl ContractValidator {
    pub fn new(provider: Arc<dyn Provider + Send + Sync>) -> Self {
        Self { provider }
    }

    /// Validate the price fetcher and every watched collection.
    ///
    /// Fails if the price fetcher has no code.
    #[instrument(skip(self, collections))]
    pub async fn validate_all(
        &self,
        price_fetcher: Address,
        collections: &[(String, Address)],
    ) -> Result<Vec<ValidationResult>> {
        let fetcher = self.validate_contract("ZoraNFTPriceFetcher", price_fetcher).await?;

        anyhow::ensure!(
            fetcher.has_code,
            "Price fetcher at {price_fetcher} has no deployed code — check config.toml"
        );
        info!(address = %price_fetcher, "Price fetcher validated: code exists on-chain");

        let mut results = vec![fetcher];

        for (label, address) in collections {
            let result = self.validate_contract(label, *address).await?;

            if result.has_code {
                info!(collection = %label, address = %address, "Collection validated");
            } else {
                warn!(
                    collection = %label,
                    address = %address,
                    "Collection has no code — item will never be listed"
                );
            }

            results.push(result);
        }

        Ok(results)
    }

    /// Check whether code exists at the address.
    async fn validate_contract(&self, name: &str, address: Address) -> Result<ValidationResult> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to query code for {name}"))?;

        Ok(ValidationResult {
            name: name.to_string(),
            address,
            has_code: !code.is_empty(),
        })
    }
}
