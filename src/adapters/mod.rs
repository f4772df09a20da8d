//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (blockchain RPC, HTTP servers, stdout).
//!
//! Adapter categories:
//! - `chain`: Zora price fetcher reads via alloy-rs
//! - `metrics`: Prometheus metrics export and health checks
//! - `presentation`: Console and JSON rendering of quotes

pub mod chain;
pub mod metrics;
pub mod presentation;
