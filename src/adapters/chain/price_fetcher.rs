//! Price Fetcher Contract - Zora Sale State via `eth_call`
//!
//! Implements the `LedgerQuery` port against a deployed
//! `ZoraNFTPriceFetcher` view contract. Every read is a plain
//! `eth_call` with ABI encoding from `sol!`, wrapped in a per-call
//! timeout and exponential backoff on transport failure. The contract
//! address comes from `config.toml` and is validated at startup.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::config::ChainConfig;
use crate::domain::sale::{BestPriceResult, ItemIdentity};
use crate::ports::ledger::{AuctionRecord, LedgerQuery, ListingRecord, LookupError};

use super::provider::LedgerProvider;

sol! {
    /// Read-only view over Zora's fixed-price and auction modules.
    interface IZoraNFTPriceFetcher {
        function isNFTListed(address nftContract, uint256 tokenId)
            external view returns (bool listed);

        function getFixedPriceListing(address nftContract, uint256 tokenId)
            external view returns (bool exists, uint256 price, address seller);

        function getAuctionDetails(address nftContract, uint256 tokenId)
            external view returns (
                bool exists,
                uint256 reservePrice,
                uint256 highestBid,
                address highestBidder,
                uint256 endTime,
                bool active
            );

        function getBestPrice(address nftContract, uint256 tokenId)
            external view returns (bool available, uint256 bestPrice, bool isAuction);
    }
}

use IZoraNFTPriceFetcher::{
    getAuctionDetailsCall, getBestPriceCall, getFixedPriceListingCall, isNFTListedCall,
};

/// Retry and timeout policy for contract reads.
#[derive(Debug, Clone, Copy)]
pub struct CallPolicy {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub retry_base_delay: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

impl From<&ChainConfig> for CallPolicy {
    fn from(config: &ChainConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay(),
        }
    }
}

/// `LedgerQuery` implementation backed by the price fetcher contract.
pub struct PriceFetcherContract {
    /// Shared RPC provider.
    provider: Arc<LedgerProvider>,
    /// Deployed `ZoraNFTPriceFetcher` address.
    address: Address,
    policy: CallPolicy,
}

impl PriceFetcherContract {
    pub fn new(provider: Arc<LedgerProvider>, address: Address, policy: CallPolicy) -> Self {
        Self {
            provider,
            address,
            policy,
        }
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    /// Encode, send and decode one view call.
    async fn view<C: SolCall + Send + Sync>(
        &self,
        call: &C,
    ) -> Result<C::Return, LookupError> {
        let tx = TransactionRequest::default()
            .to(self.address)
            .input(Bytes::from(call.abi_encode()).into());

        let raw = self.call_with_retry(&tx, C::SIGNATURE).await?;

        C::abi_decode_returns(&raw, true)
            .map_err(|e| LookupError::malformed(C::SIGNATURE, e.to_string()))
    }

    /// Execute an `eth_call` with timeout and exponential backoff.
    ///
    /// A JSON-RPC error response (revert, bad params) means the node
    /// answered; it is reported as `Malformed` and never retried.
    async fn call_with_retry(
        &self,
        tx: &TransactionRequest,
        method: &'static str,
    ) -> Result<Bytes, LookupError> {
        let inner = self.provider.inner();
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                let delay = self.policy.retry_base_delay * 2u32.pow(attempt - 1);
                debug!(method, attempt, delay_ms = delay.as_millis(), "Retrying eth_call");
                sleep(delay).await;
            }

            match tokio::time::timeout(self.policy.timeout, inner.call(tx)).await {
                Ok(Ok(bytes)) => return Ok(bytes),
                Ok(Err(e)) if e.as_error_resp().is_some() => {
                    return Err(LookupError::malformed(method, format!("call rejected: {e}")));
                }
                Ok(Err(e)) => {
                    warn!(method, attempt, error = %e, "eth_call failed");
                    last_error = Some(LookupError::Unreachable {
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    warn!(method, attempt, "eth_call timed out");
                    last_error = Some(LookupError::Timeout {
                        after_ms: u64::try_from(self.policy.timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    });
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LookupError::Unreachable {
            reason: "max retries exceeded".to_string(),
        }))
    }
}

#[async_trait]
impl LedgerQuery for PriceFetcherContract {
    #[instrument(skip(self, item), fields(item = %item))]
    async fn query_listing(&self, item: &ItemIdentity) -> Result<ListingRecord, LookupError> {
        let ret = self
            .view(&getFixedPriceListingCall {
                nftContract: item.collection,
                tokenId: item.token_id,
            })
            .await?;

        Ok(ListingRecord {
            exists: ret.exists,
            price: ret.price,
            seller: ret.seller,
        })
    }

    #[instrument(skip(self, item), fields(item = %item))]
    async fn query_auction(&self, item: &ItemIdentity) -> Result<AuctionRecord, LookupError> {
        let ret = self
            .view(&getAuctionDetailsCall {
                nftContract: item.collection,
                tokenId: item.token_id,
            })
            .await?;

        Ok(AuctionRecord {
            exists: ret.exists,
            reserve_price: ret.reservePrice,
            highest_bid: ret.highestBid,
            highest_bidder: ret.highestBidder,
            end_time: ret.endTime,
            active: ret.active,
        })
    }

    #[instrument(skip(self, item), fields(item = %item))]
    async fn query_exists(&self, item: &ItemIdentity) -> Result<bool, LookupError> {
        let ret = self
            .view(&isNFTListedCall {
                nftContract: item.collection,
                tokenId: item.token_id,
            })
            .await?;

        Ok(ret.listed)
    }

    #[instrument(skip(self, item), fields(item = %item))]
    async fn query_best_price(&self, item: &ItemIdentity) -> Result<BestPriceResult, LookupError> {
        let ret = self
            .view(&getBestPriceCall {
                nftContract: item.collection,
                tokenId: item.token_id,
            })
            .await?;

        // The contract may leave a stale price behind an unavailable answer.
        if !ret.available {
            return Ok(BestPriceResult::unavailable());
        }

        Ok(BestPriceResult {
            available: true,
            best_price: ret.bestPrice,
            is_auction: ret.isAuction,
        })
    }

    async fn is_healthy(&self) -> bool {
        self.provider.is_healthy().await
    }
}
