//! Cross-component scenarios: mempool -> packer -> detector -> store ->
//! reconciler, driven through the forecast manager against a mock node.

use std::{sync::Arc, time::{Duration, Instant}};

use alloy_primitives::{address, Address, Bytes, TxHash, B256, U256};
use blockcast_decode::Decoder;
use blockcast_forecast::{ForecastConfig, ForecastManager};
use blockcast_mempool::{AnnotationCache, MempoolState};
use blockcast_node::{test_utils::MockNode, NodeEvent};
use blockcast_registry::{ContractRegistry, RegistryConfig};
use blockcast_storage::{MemoryStore, Store};
use blockcast_types::{ObservedBlock, PendingTx, TxKind, TxStatus};
use blockcast_utils::{shutdown_channel, RateLimiter, ShutdownHandle};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

const GWEI: u128 = 1_000_000_000;

struct Harness {
    events:    UnboundedSender<NodeEvent>,
    node:      MockNode,
    mempool:   MempoolState,
    store:     Arc<MemoryStore>,
    _shutdown: ShutdownHandle
}

fn harness() -> Harness {
    let (events_tx, events_rx) = unbounded_channel();
    let node = MockNode::default();
    let store = Arc::new(MemoryStore::default());
    let registry = Arc::new(ContractRegistry::new(store.clone(), RegistryConfig::default()));
    let limiter = RateLimiter::new(8);
    let decoder = Arc::new(Decoder::new(node.clone(), registry, limiter));
    let mempool = MempoolState::new();
    let cache = AnnotationCache::default();
    let (shutdown, signal) = shutdown_channel();

    ForecastManager::spawn(
        events_rx,
        node.clone(),
        mempool.clone(),
        cache,
        decoder,
        store.clone(),
        ForecastConfig { interval: Duration::from_millis(40), stale_depth: 5 },
        signal
    );

    Harness { events: events_tx, node, mempool, store, _shutdown: shutdown }
}

fn transfer_tx(hash: u8, priority_gwei: u128) -> PendingTx {
    PendingTx {
        hash: B256::with_last_byte(hash),
        from: Address::with_last_byte(1),
        to: Some(Address::with_last_byte(2)),
        value: U256::from(GWEI),
        gas_limit: 21_000,
        nonce: Some(0),
        gas_price: None,
        max_fee_per_gas: Some(100 * GWEI),
        max_priority_fee_per_gas: Some(priority_gwei * GWEI),
        input: Bytes::new(),
        first_seen: Instant::now(),
        status: TxStatus::Pending
    }
}

/// Router swap with the token pair sitting in the first two ABI slots, the
/// shape the pair extraction expects.
fn swap_tx(hash: u8, priority_gwei: u128, value_milli_eth: u128) -> PendingTx {
    let router = address!("7a250d5630b4cf539739df2c5dacb4c659f2488d");
    let weth = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    let usdc = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");

    let mut input = vec![0x38, 0xed, 0x17, 0x39];
    let mut slot = [0u8; 32];
    slot[12..].copy_from_slice(weth.as_slice());
    input.extend_from_slice(&slot);
    slot[12..].copy_from_slice(usdc.as_slice());
    input.extend_from_slice(&slot);

    PendingTx {
        hash: B256::with_last_byte(hash),
        from: Address::with_last_byte(3),
        to: Some(router),
        value: U256::from(value_milli_eth * 1_000_000_000_000_000),
        gas_limit: 200_000,
        nonce: Some(0),
        gas_price: None,
        max_fee_per_gas: Some(200 * GWEI),
        max_priority_fee_per_gas: Some(priority_gwei * GWEI),
        input: Bytes::from(input),
        first_seen: Instant::now(),
        status: TxStatus::Pending
    }
}

fn header(number: u64, base_fee_gwei: u128) -> ObservedBlock {
    ObservedBlock {
        number,
        hash: B256::with_last_byte(number as u8),
        parent_hash: B256::with_last_byte(number.saturating_sub(1) as u8),
        timestamp: 1_700_000_000 + number * 12,
        miner: Address::with_last_byte(0xee),
        extra_data: Bytes::new(),
        gas_limit: 30_000_000,
        gas_used: 0,
        base_fee_per_gas: Some(base_fee_gwei * GWEI),
        transactions: Vec::new()
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test]
async fn perfect_forecast_scores_100() {
    let harness = harness();

    let txs: Vec<PendingTx> =
        vec![transfer_tx(1, 5), transfer_tx(2, 3), transfer_tx(3, 1)];
    for tx in &txs {
        harness.mempool.ingest(tx.clone());
    }
    harness.node.add_block(header(1, 10), Vec::new());

    harness.events.send(NodeEvent::NewHead(header(1, 10))).unwrap();
    settle().await;

    let predictions = harness.store.recent_predictions(50).await.unwrap();
    let prediction = predictions.iter().find(|p| p.block_number == 2).unwrap();
    let expected: Vec<TxHash> =
        (1..=3).map(B256::with_last_byte).collect();
    assert_eq!(prediction.predicted_transactions, expected);
    assert_eq!(prediction.predicted_gas_price, 3.0);

    // the block arrives containing exactly the predicted set
    let mut mined = header(2, 10);
    mined.transactions = expected.clone();
    mined.extra_data = Bytes::from_iter(b"@beaverbuild.org".iter().copied());
    harness.node.add_block(mined.clone(), txs);

    harness.events.send(NodeEvent::NewHead(header(2, 10))).unwrap();
    settle().await;

    let comparisons = harness.store.recent_comparisons(10).await.unwrap();
    let comparison = comparisons.iter().find(|c| c.block_number == 2).unwrap();
    assert_eq!(comparison.accuracy, 100.0);
    assert_eq!(comparison.builder_name.as_deref(), Some("beaverbuild"));
    assert_eq!(comparison.average_gas_price, Some(3.0));

    // confirmed transactions left the mempool
    assert!(harness.mempool.is_empty());
}

#[tokio::test]
async fn sandwich_triple_is_placed_and_flagged() {
    let harness = harness();

    // frontrun 50 gwei / 0.01 ETH, victim 10 gwei / 1 ETH, backrun 30 gwei
    let frontrun = swap_tx(0xf0, 50, 10);
    let target = swap_tx(0xf1, 10, 1000);
    let backrun = swap_tx(0xf2, 30, 10);
    for tx in [&frontrun, &target, &backrun] {
        harness.mempool.ingest(tx.clone());
    }
    harness.node.add_block(header(1, 10), Vec::new());

    harness.events.send(NodeEvent::NewHead(header(1, 10))).unwrap();
    settle().await;

    let predictions = harness.store.recent_predictions(50).await.unwrap();
    let prediction = predictions.iter().find(|p| p.block_number == 2).unwrap();

    let position = |hash: TxHash| {
        prediction
            .predicted_transactions
            .iter()
            .position(|h| *h == hash)
            .unwrap()
    };
    assert!(position(frontrun.hash) < position(target.hash));
    assert!(position(target.hash) < position(backrun.hash));

    for hash in [frontrun.hash, target.hash, backrun.hash] {
        assert_eq!(prediction.transaction_details[&hash].kind, TxKind::Sandwich);
    }
    assert!(prediction.transaction_details[&target.hash].is_sandwich_target);
    assert!(!prediction.transaction_details[&frontrun.hash].is_sandwich_target);
    assert!(!prediction.transaction_details[&backrun.hash].is_sandwich_target);
}

#[tokio::test]
async fn session_reset_drops_outstanding_forecasts() {
    let harness = harness();

    harness.mempool.ingest(transfer_tx(1, 5));
    harness.node.add_block(header(1, 10), Vec::new());
    harness.events.send(NodeEvent::NewHead(header(1, 10))).unwrap();
    settle().await;
    assert!(!harness.store.recent_predictions(50).await.unwrap().is_empty());

    harness.events.send(NodeEvent::SessionReset).unwrap();

    // the prediction for block 2 was forgotten, so its arrival produces no
    // comparison
    let mut mined = header(2, 10);
    mined.transactions = vec![B256::with_last_byte(1)];
    harness.node.add_block(mined, vec![transfer_tx(1, 5)]);
    harness.events.send(NodeEvent::NewHead(header(2, 10))).unwrap();
    settle().await;

    let comparisons = harness.store.recent_comparisons(10).await.unwrap();
    assert!(comparisons.iter().all(|c| c.block_number != 2));
}

#[tokio::test]
async fn missed_heads_replay_in_order() {
    let harness = harness();

    // transactions mined in blocks 2 and 3, which never arrive as heads
    let in_block_2 = transfer_tx(0x21, 2);
    let in_block_3 = transfer_tx(0x31, 2);
    harness.mempool.ingest(in_block_2.clone());
    harness.mempool.ingest(in_block_3.clone());

    harness.node.add_block(header(1, 10), Vec::new());
    let mut block2 = header(2, 10);
    block2.transactions = vec![in_block_2.hash];
    harness.node.add_block(block2, vec![in_block_2.clone()]);
    let mut block3 = header(3, 10);
    block3.transactions = vec![in_block_3.hash];
    harness.node.add_block(block3, vec![in_block_3.clone()]);
    let mut block4 = header(4, 10);
    block4.transactions = Vec::new();
    harness.node.add_block(block4, Vec::new());

    harness.events.send(NodeEvent::NewHead(header(1, 10))).unwrap();
    settle().await;
    // the node skips straight to head 4; blocks 2 and 3 are replayed
    harness.events.send(NodeEvent::NewHead(header(4, 10))).unwrap();
    settle().await;

    assert!(!harness.mempool.contains(&in_block_2.hash));
    assert!(!harness.mempool.contains(&in_block_3.hash));
}
