use std::{sync::Arc, time::{Duration, Instant}};

use alloy_primitives::TxHash;
use blockcast_decode::Decoder;
use blockcast_node::{NodeEvent, NodeRpc};
use blockcast_utils::{RateLimiter, ShutdownSignal};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{debug, info, trace};

use crate::{AnnotationCache, MempoolState, MEMPOOL_TTL};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(1);

/// Drives mempool ingestion from the node's pending stream.
///
/// Each observed hash is fetched through the shared rate limiter and
/// ingested; annotation is opportunistic and dropped under pressure, the
/// transaction itself never is. A periodic sweep evicts stale entries from
/// both the pool and the annotation cache.
pub struct MempoolManager<N> {
    events:   UnboundedReceiver<NodeEvent>,
    mempool:  MempoolState,
    cache:    AnnotationCache,
    decoder:  Arc<Decoder<N>>,
    node:     N,
    limiter:  RateLimiter,
    shutdown: ShutdownSignal
}

impl<N: NodeRpc> MempoolManager<N> {
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        events: UnboundedReceiver<NodeEvent>,
        mempool: MempoolState,
        cache: AnnotationCache,
        decoder: Arc<Decoder<N>>,
        node: N,
        limiter: RateLimiter,
        shutdown: ShutdownSignal
    ) -> JoinHandle<()> {
        let this = Self { events, mempool, cache, decoder, node, limiter, shutdown };
        tokio::spawn(this.run())
    }

    async fn run(mut self) {
        let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.wait() => break,

                _ = sweep.tick() => self.sweep(),

                event = self.events.recv() => match event {
                    None => break,
                    Some(event) => self.on_event(event)
                }
            }
        }

        debug!(target: "mempool", "mempool manager stopped");
    }

    fn on_event(&self, event: NodeEvent) {
        match event {
            NodeEvent::PendingTransaction(hash) => {
                if self.mempool.contains(&hash) {
                    return
                }
                self.spawn_ingest(hash);
            }
            NodeEvent::SessionReset => {
                info!(target: "mempool", "session reset, clearing mempool state");
                self.mempool.clear();
                self.cache.clear();
                self.decoder.clear_caches();
            }
            // block confirmation is driven by the reconciler
            NodeEvent::NewHead(_) => {}
        }
    }

    fn spawn_ingest(&self, hash: TxHash) {
        let node = self.node.clone();
        let limiter = self.limiter.clone();
        let mempool = self.mempool.clone();
        let cache = self.cache.clone();
        let decoder = self.decoder.clone();

        tokio::spawn(async move {
            match limiter.submit(node.transaction(hash)).await {
                Ok(Some(tx)) => {
                    if !mempool.ingest(tx.clone()) {
                        return
                    }
                    trace!(target: "mempool", %hash, "ingested pending transaction");

                    if cache.contains(&hash) {
                        return
                    }
                    // annotation is droppable: skip it when the limiter is
                    // saturated instead of queueing more node calls
                    if limiter.available() == 0 {
                        debug!(target: "mempool", %hash, "annotation skipped under pressure");
                        return
                    }
                    let annotation = decoder.annotate(&tx).await;
                    cache.insert(hash, annotation);
                }
                Ok(None) => {
                    trace!(target: "mempool", %hash, "pending transaction already gone");
                }
                Err(err) if err.is_rate_limited() => {
                    debug!(target: "mempool", %hash, "fetch rate limited, backing off");
                    tokio::time::sleep(RATE_LIMIT_PAUSE).await;
                }
                Err(err) => {
                    debug!(target: "mempool", %hash, %err, "pending fetch failed");
                }
            }
        });
    }

    fn sweep(&self) {
        let now = Instant::now();
        let evicted_txs = self.mempool.evict_stale(now, MEMPOOL_TTL);
        let evicted_annotations = self.cache.evict_stale(now);
        if evicted_txs > 0 || evicted_annotations > 0 {
            debug!(
                target: "mempool",
                evicted_txs,
                evicted_annotations,
                remaining = self.mempool.len(),
                "evicted stale entries"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use alloy_primitives::{Address, Bytes, B256, U256};
    use blockcast_node::test_utils::MockNode;
    use blockcast_registry::{ContractRegistry, RegistryConfig};
    use blockcast_storage::MemoryStore;
    use blockcast_types::{PendingTx, TxStatus};
    use blockcast_utils::shutdown_channel;
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    fn pending(hash: u8) -> PendingTx {
        PendingTx {
            hash: B256::with_last_byte(hash),
            from: Address::with_last_byte(1),
            to: Some(Address::with_last_byte(2)),
            value: U256::from(1u8),
            gas_limit: 21_000,
            nonce: Some(0),
            gas_price: None,
            max_fee_per_gas: Some(20_000_000_000),
            max_priority_fee_per_gas: Some(1_000_000_000),
            input: Bytes::new(),
            first_seen: Instant::now(),
            status: TxStatus::Pending
        }
    }

    fn spawn_manager(
        node: MockNode
    ) -> (
        tokio::sync::mpsc::UnboundedSender<NodeEvent>,
        MempoolState,
        AnnotationCache,
        blockcast_utils::ShutdownHandle
    ) {
        let (events_tx, events_rx) = unbounded_channel();
        let mempool = MempoolState::new();
        let cache = AnnotationCache::default();
        let registry = Arc::new(ContractRegistry::new(
            Arc::new(MemoryStore::default()),
            RegistryConfig::default()
        ));
        let limiter = RateLimiter::new(8);
        let decoder = Arc::new(Decoder::new(node.clone(), registry, limiter.clone()));
        let (handle, signal) = shutdown_channel();

        MempoolManager::spawn(
            events_rx,
            mempool.clone(),
            cache.clone(),
            decoder,
            node,
            limiter,
            signal
        );

        (events_tx, mempool, cache, handle)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn pending_event_ingests_and_annotates() {
        let node = MockNode::default();
        let tx = pending(1);
        node.add_transaction(tx.clone());

        let (events, mempool, cache, _shutdown) = spawn_manager(node);
        events.send(NodeEvent::PendingTransaction(tx.hash)).unwrap();
        settle().await;

        assert!(mempool.contains(&tx.hash));
        // native transfer annotation was cached alongside
        assert!(cache.contains(&tx.hash));
    }

    #[tokio::test]
    async fn session_reset_clears_everything() {
        let node = MockNode::default();
        let tx = pending(2);
        node.add_transaction(tx.clone());

        let (events, mempool, cache, _shutdown) = spawn_manager(node);
        events.send(NodeEvent::PendingTransaction(tx.hash)).unwrap();
        settle().await;
        assert!(!mempool.is_empty());

        events.send(NodeEvent::SessionReset).unwrap();
        settle().await;

        assert!(mempool.is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn unknown_hash_is_dropped_quietly() {
        let (events, mempool, _cache, _shutdown) = spawn_manager(MockNode::default());
        events
            .send(NodeEvent::PendingTransaction(B256::with_last_byte(42)))
            .unwrap();
        settle().await;
        assert!(mempool.is_empty());
    }
}
