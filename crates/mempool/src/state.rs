use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant}
};

use alloy_primitives::TxHash;
use blockcast_types::PendingTx;
use parking_lot::RwLock;

/// Thread-safe `hash -> PendingTx` map.
///
/// Ingest is idempotent; confirmation removes every supplied hash; eviction
/// drops entries older than the mempool TTL.
#[derive(Debug, Clone, Default)]
pub struct MempoolState {
    inner: Arc<RwLock<HashMap<TxHash, PendingTx>>>
}

impl MempoolState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transaction. Re-ingesting a known hash updates nothing;
    /// returns whether the entry is new.
    pub fn ingest(&self, tx: PendingTx) -> bool {
        let mut inner = self.inner.write();
        if inner.contains_key(&tx.hash) {
            return false
        }
        inner.insert(tx.hash, tx);
        true
    }

    /// Removes every transaction included in a canonical block. Returns how
    /// many were actually present.
    pub fn confirm_block(&self, hashes: &[TxHash]) -> usize {
        let mut inner = self.inner.write();
        hashes.iter().filter(|hash| inner.remove(*hash).is_some()).count()
    }

    /// Drops entries first seen more than `ttl` before `now`.
    pub fn evict_stale(&self, now: Instant, ttl: Duration) -> usize {
        let mut inner = self.inner.write();
        let before = inner.len();
        inner.retain(|_, tx| now.duration_since(tx.first_seen) <= ttl);
        before - inner.len()
    }

    pub fn get(&self, hash: &TxHash) -> Option<PendingTx> {
        self.inner.read().get(hash).cloned()
    }

    pub fn contains(&self, hash: &TxHash) -> bool {
        self.inner.read().contains_key(hash)
    }

    pub fn snapshot(&self) -> Vec<PendingTx> {
        self.inner.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Full reset, used when the node session is re-established.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}
