//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    items = config.items.len(),
    chain_id = config.chain.chain_id,
    price_fetcher = %config.chain.price_fetcher,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Chain validation
  anyhow::ensure!(
    !config.chain.rpc_url.is_empty(),
    "chain.rpc_url must not be empty"
  );
  anyhow::ensure!(
    !config.chain.price_fetcher.is_zero(),
    "chain.price_fetcher must not be the zero address"
  );
  anyhow::ensure!(
    config.chain.timeout_ms > 0,
    "chain.timeout_ms must be positive"
  );
  anyhow::ensure!(
    config.chain.max_retries <= 10,
    "chain.max_retries must be at most 10, got {}",
    config.chain.max_retries
  );

  // Item validation
  let mut labels = HashSet::new();
  for (i, item) in config.items.iter().enumerate() {
    anyhow::ensure!(!item.label.is_empty(), "Item {i} has an empty label");
    anyhow::ensure!(
      labels.insert(item.label.as_str()),
      "Duplicate item label {:?}",
      item.label
    );
    item
      .identity()
      .with_context(|| format!("Item {i} ({}) is invalid", item.label))?;
  }

  // Watch validation
  anyhow::ensure!(
    config.watch.poll_interval_seconds > 0,
    "watch.poll_interval_seconds must be positive"
  );
  anyhow::ensure!(
    (1..=64).contains(&config.watch.max_concurrent_queries),
    "watch.max_concurrent_queries must be in [1, 64], got {}",
    config.watch.max_concurrent_queries
  );

  Ok(())
}
