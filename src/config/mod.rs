//! Configuration Module - TOML-based Resolver Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! The RPC endpoint, price fetcher address and watched items are
//! externalized here - nothing is hardcoded in the domain layer.

pub mod loader;

use std::time::Duration;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::domain::sale::{IdentityError, ItemIdentity};

/// Top-level resolver configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  pub resolver: ResolverConfig,
  /// Ledger connection.
  pub chain: ChainConfig,
  /// Items to quote.
  #[serde(default)]
  pub items: Vec<ItemConfig>,
  /// Watch mode scheduling.
  #[serde(default)]
  pub watch: WatchConfig,
  /// Metrics and health endpoints (watch mode only).
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Ledger (RPC + contract) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// JSON-RPC HTTP endpoint.
  pub rpc_url: String,
  /// Deployed `ZoraNFTPriceFetcher` contract.
  pub price_fetcher: Address,
  /// Expected chain id, checked at startup.
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// Per-call timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Retries after the first attempt on transport failure.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Base delay for exponential backoff (milliseconds).
  #[serde(default = "default_retry_base_delay_ms")]
  pub retry_base_delay_ms: u64,
  /// Compare every quote with the contract's own `getBestPrice`.
  #[serde(default)]
  pub verify_onchain_best_price: bool,
}

impl ChainConfig {
  pub const fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }

  pub const fn retry_base_delay(&self) -> Duration {
    Duration::from_millis(self.retry_base_delay_ms)
  }
}

/// One NFT to quote.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemConfig {
  /// Human-readable label used in logs and metrics.
  pub label: String,
  /// Collection contract address.
  pub collection: String,
  /// Token id, decimal or `0x` hex.
  pub token_id: String,
}

impl ItemConfig {
  pub fn identity(&self) -> Result<ItemIdentity, IdentityError> {
    ItemIdentity::parse(&self.collection, &self.token_id)
  }
}

/// Watch mode configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
  /// Seconds between monitor cycles.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_seconds: u64,
  /// Items quoted in parallel per cycle.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent_queries: usize,
}

impl Default for WatchConfig {
  fn default() -> Self {
    Self {
      poll_interval_seconds: default_poll_interval(),
      max_concurrent_queries: default_max_concurrent(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_chain_id() -> u64 {
  1 // Ethereum mainnet
}

fn default_timeout_ms() -> u64 {
  10_000
}

fn default_max_retries() -> u32 {
  3
}

fn default_retry_base_delay_ms() -> u64 {
  200
}

fn default_poll_interval() -> u64 {
  60
}

fn default_max_concurrent() -> usize {
  4
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}
