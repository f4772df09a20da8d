//! Integration Tests - Resolver Against a Mocked Ledger
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use mockall::mock;
use tokio::sync::{broadcast, mpsc};

use zora_price_resolver::domain::sale::{
    AuctionFact, BestPriceResult, ItemIdentity, ListingFact,
};
use zora_price_resolver::ports::ledger::{
    AuctionRecord, LedgerQuery, ListingRecord, LookupError,
};
use zora_price_resolver::usecases::{PriceMonitor, PriceResolver, WatchedItem};

// ---- Mock Definitions ----

mock! {
    pub Ledger {}

    #[async_trait::async_trait]
    impl LedgerQuery for Ledger {
        async fn query_listing(&self, item: &ItemIdentity) -> Result<ListingRecord, LookupError>;
        async fn query_auction(&self, item: &ItemIdentity) -> Result<AuctionRecord, LookupError>;
        async fn query_exists(&self, item: &ItemIdentity) -> Result<bool, LookupError>;
        async fn query_best_price(&self, item: &ItemIdentity)
            -> Result<BestPriceResult, LookupError>;
        async fn is_healthy(&self) -> bool;
    }
}

// ---- Fixtures ----

const ETH: u128 = 1_000_000_000_000_000_000;

fn blitmap(token_id: u64) -> ItemIdentity {
    ItemIdentity::parse("0x8d04a8c79cEB0889Bdd12acdF3Fa9D207eD3Ff63", &token_id.to_string())
        .unwrap()
}

fn listing_row(price: u128) -> ListingRecord {
    ListingRecord {
        exists: true,
        price: U256::from(price),
        seller: Address::repeat_byte(0x5e),
    }
}

fn auction_row(reserve: u128, bid: u128, active: bool) -> AuctionRecord {
    AuctionRecord {
        exists: true,
        reserve_price: U256::from(reserve),
        highest_bid: U256::from(bid),
        highest_bidder: if bid > 0 { Address::repeat_byte(0xb1) } else { Address::ZERO },
        end_time: U256::from(1_700_000_000u64),
        active,
    }
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_unlisted_item_skips_detail_fetch() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_exists().times(1).returning(|_| Ok(false));
    ledger.expect_query_listing().times(0);
    ledger.expect_query_auction().times(0);

    let resolver = PriceResolver::new(Arc::new(ledger));
    let quote = resolver.quote(&blitmap(1)).await.unwrap();

    assert!(!quote.listed);
    assert_eq!(quote.best, BestPriceResult::unavailable());
    assert_eq!(quote.listing, ListingFact::absent());
    assert_eq!(quote.auction, AuctionFact::absent());
}

#[tokio::test]
async fn test_cheaper_auction_beats_listing() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_exists().returning(|_| Ok(true));
    ledger
        .expect_query_listing()
        .withf(|item| item.token_id == U256::from(7))
        .returning(|_| Ok(listing_row(150)));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(auction_row(100, 120, true)));

    let resolver = PriceResolver::new(Arc::new(ledger));
    let quote = resolver.quote(&blitmap(7)).await.unwrap();

    assert!(quote.listed);
    assert_eq!(quote.best, BestPriceResult::auction(U256::from(120)));
    assert_eq!(quote.auction.highest_bidder, Some(Address::repeat_byte(0xb1)));
}

#[tokio::test]
async fn test_tie_goes_to_fixed_price() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_listing().returning(|_| Ok(listing_row(100)));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(auction_row(100, 0, true)));

    let resolver = PriceResolver::new(Arc::new(ledger));
    let best = resolver.best_price(&blitmap(1)).await.unwrap();

    assert_eq!(best, BestPriceResult::fixed(U256::from(100)));
}

#[tokio::test]
async fn test_ended_auction_still_priced() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_query_listing()
        .returning(|_| Ok(ListingRecord::default()));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(auction_row(2 * ETH, 3 * ETH, false)));

    let resolver = PriceResolver::new(Arc::new(ledger));
    let (listing, auction) = resolver.get_facts(&blitmap(3)).await.unwrap();
    let best = resolver.best_price(&blitmap(3)).await.unwrap();

    assert!(!listing.exists);
    assert!(auction.exists);
    assert!(!auction.active);
    assert_eq!(best, BestPriceResult::auction(U256::from(3 * ETH)));
}

#[tokio::test]
async fn test_lookup_error_propagates_unmodified() {
    let failure = LookupError::Unreachable {
        reason: "connection refused".to_string(),
    };
    let returned = failure.clone();

    let mut ledger = MockLedger::new();
    ledger.expect_query_exists().returning(|_| Ok(true));
    ledger.expect_query_listing().returning(|_| Ok(listing_row(1)));
    ledger
        .expect_query_auction()
        .returning(move |_| Err(returned.clone()));

    let resolver = PriceResolver::new(Arc::new(ledger));
    let err = resolver.quote(&blitmap(1)).await.unwrap_err();

    assert_eq!(err, failure);
}

#[tokio::test]
async fn test_malformed_listing_is_rejected() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_listing().returning(|_| {
        Ok(ListingRecord {
            exists: true,
            price: U256::from(10),
            seller: Address::ZERO,
        })
    });

    let resolver = PriceResolver::new(Arc::new(ledger));
    let err = resolver.get_listing(&blitmap(1)).await.unwrap_err();

    assert_eq!(err.kind(), "malformed");
}

#[tokio::test]
async fn test_absence_is_not_an_error() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_query_listing()
        .returning(|_| Ok(ListingRecord::default()));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(AuctionRecord::default()));

    let resolver = PriceResolver::new(Arc::new(ledger));
    let best = resolver.best_price(&blitmap(9)).await.unwrap();

    assert!(!best.available);
    assert_eq!(best.best_price, U256::ZERO);
}

#[test]
fn test_is_listed_passes_probe_through() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_query_exists()
        .withf(|item| item.token_id == U256::from(1))
        .returning(|_| Ok(true));
    ledger
        .expect_query_exists()
        .withf(|item| item.token_id == U256::from(2))
        .returning(|_| Ok(false));

    let resolver = PriceResolver::new(Arc::new(ledger));

    let listed = tokio_test::assert_ok!(tokio_test::block_on(resolver.is_listed(&blitmap(1))));
    assert!(listed);

    let unlisted = tokio_test::assert_ok!(tokio_test::block_on(resolver.is_listed(&blitmap(2))));
    assert!(!unlisted);
}

#[tokio::test]
async fn test_parity_check_reports_divergence() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_exists().returning(|_| Ok(true));
    ledger.expect_query_listing().returning(|_| Ok(listing_row(100)));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(auction_row(100, 0, true)));
    // Contract breaks the tie the other way.
    ledger
        .expect_query_best_price()
        .returning(|_| Ok(BestPriceResult::auction(U256::from(100))));

    let resolver = PriceResolver::new(Arc::new(ledger));
    let quote = resolver.quote(&blitmap(1)).await.unwrap();

    assert!(!resolver.verify_against_ledger(&quote).await.unwrap());
}

#[tokio::test]
async fn test_parity_check_agrees() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_exists().returning(|_| Ok(true));
    ledger.expect_query_listing().returning(|_| Ok(listing_row(90)));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(AuctionRecord::default()));
    ledger
        .expect_query_best_price()
        .returning(|_| Ok(BestPriceResult::fixed(U256::from(90))));

    let resolver = PriceResolver::new(Arc::new(ledger));
    let quote = resolver.quote(&blitmap(1)).await.unwrap();

    assert!(resolver.verify_against_ledger(&quote).await.unwrap());
}

// ---- Concurrency ----

/// Ledger whose listing and auction reads each take 100ms.
struct SlowLedger {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowLedger {
    async fn slow_read(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerQuery for SlowLedger {
    async fn query_listing(&self, _item: &ItemIdentity) -> Result<ListingRecord, LookupError> {
        self.slow_read().await;
        Ok(listing_row(5))
    }

    async fn query_auction(&self, _item: &ItemIdentity) -> Result<AuctionRecord, LookupError> {
        self.slow_read().await;
        Ok(auction_row(4, 0, true))
    }

    async fn query_exists(&self, _item: &ItemIdentity) -> Result<bool, LookupError> {
        Ok(true)
    }

    async fn query_best_price(&self, _item: &ItemIdentity) -> Result<BestPriceResult, LookupError> {
        Ok(BestPriceResult::unavailable())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[tokio::test(start_paused = true)]
async fn test_listing_and_auction_fetched_concurrently() {
    let ledger = Arc::new(SlowLedger {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let resolver = PriceResolver::new(Arc::clone(&ledger));

    let started = tokio::time::Instant::now();
    let best = resolver.best_price(&blitmap(1)).await.unwrap();

    assert_eq!(best, BestPriceResult::auction(U256::from(4)));
    assert_eq!(ledger.peak.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() < Duration::from_millis(200));
}

// ---- Monitor ----

#[tokio::test]
async fn test_monitor_cycle_reports_each_item() {
    let mut ledger = MockLedger::new();
    ledger
        .expect_query_exists()
        .withf(|item| item.token_id == U256::from(1))
        .returning(|_| Ok(true));
    ledger
        .expect_query_exists()
        .withf(|item| item.token_id == U256::from(2))
        .returning(|_| Err(LookupError::Timeout { after_ms: 10_000 }));
    ledger.expect_query_listing().returning(|_| Ok(listing_row(ETH)));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(AuctionRecord::default()));

    let resolver = Arc::new(PriceResolver::new(Arc::new(ledger)));
    let monitor = PriceMonitor::new(
        resolver,
        vec![
            WatchedItem { label: "one".into(), item: blitmap(1) },
            WatchedItem { label: "two".into(), item: blitmap(2) },
        ],
        Duration::from_secs(60),
        2,
    );

    let mut outcomes = monitor.run_cycle().await;
    outcomes.sort_by(|a, b| a.label.cmp(&b.label));

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        outcomes[0].result.as_ref().unwrap().best,
        BestPriceResult::fixed(U256::from(ETH))
    );
    assert_eq!(outcomes[0].matches_ledger, None);
    assert_eq!(
        outcomes[1].result.as_ref().unwrap_err(),
        &LookupError::Timeout { after_ms: 10_000 }
    );
}

#[tokio::test]
async fn test_monitor_verifies_and_stops_on_shutdown() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_exists().returning(|_| Ok(true));
    ledger.expect_query_listing().returning(|_| Ok(listing_row(100)));
    ledger
        .expect_query_auction()
        .returning(|_| Ok(AuctionRecord::default()));
    ledger
        .expect_query_best_price()
        .returning(|_| Ok(BestPriceResult::fixed(U256::from(100))));

    let resolver = Arc::new(PriceResolver::new(Arc::new(ledger)));
    let monitor = Arc::new(
        PriceMonitor::new(
            resolver,
            vec![WatchedItem { label: "only".into(), item: blitmap(1) }],
            Duration::from_secs(3600),
            1,
        )
        .with_onchain_verification(true),
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (cycle_tx, mut cycle_rx) = mpsc::unbounded_channel();

    let task_monitor = Arc::clone(&monitor);
    let handle = tokio::spawn(async move {
        task_monitor
            .run(shutdown_rx, move |outcomes| {
                let matched: Vec<_> = outcomes.iter().map(|o| o.matches_ledger).collect();
                let _ = cycle_tx.send(matched);
            })
            .await;
    });

    let first = tokio::time::timeout(Duration::from_secs(5), cycle_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, vec![Some(true)]);

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_monitor_cycle_runs_on_spawned_task() {
    let mut ledger = MockLedger::new();
    ledger.expect_query_exists().returning(|_| Ok(false));

    let resolver = Arc::new(PriceResolver::new(Arc::new(ledger)));
    let monitor = Arc::new(PriceMonitor::new(
        resolver,
        vec![
            WatchedItem { label: "a".into(), item: blitmap(1) },
            WatchedItem { label: "b".into(), item: blitmap(2) },
            WatchedItem { label: "c".into(), item: blitmap(3) },
        ],
        Duration::from_secs(60),
        2,
    ));

    let task_monitor = Arc::clone(&monitor);
    let outcomes = tokio::spawn(async move { task_monitor.run_cycle().await })
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes
        .iter()
        .all(|o| matches!(&o.result, Ok(quote) if !quote.listed)));
}
