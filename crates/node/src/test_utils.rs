//! Fixture-backed [`NodeRpc`] implementation for tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc
    }
};

use alloy_primitives::{Address, Bytes, TxHash};
use blockcast_types::{ObservedBlock, PendingTx};
use parking_lot::RwLock;

use crate::{
    error::NodeError,
    traits::{FetchedBlock, NodeRpc}
};

/// In-memory node. Fixtures are registered up front; `set_rate_limited`
/// makes every on-demand call answer with [`NodeError::RateLimited`].
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    inner: Arc<Inner>
}

#[derive(Debug, Default)]
struct Inner {
    txs:          RwLock<HashMap<TxHash, PendingTx>>,
    blocks:       RwLock<HashMap<u64, FetchedBlock>>,
    calls:        RwLock<HashMap<(Address, Bytes), Bytes>>,
    rate_limited: AtomicBool
}

impl MockNode {
    pub fn add_transaction(&self, tx: PendingTx) {
        self.inner.txs.write().insert(tx.hash, tx);
    }

    pub fn add_block(&self, block: ObservedBlock, txs: Vec<PendingTx>) {
        self.inner
            .blocks
            .write()
            .insert(block.number, FetchedBlock { block, txs });
    }

    pub fn set_call_response(&self, to: Address, data: Bytes, response: Bytes) {
        self.inner.calls.write().insert((to, data), response);
    }

    pub fn set_rate_limited(&self, limited: bool) {
        self.inner.rate_limited.store(limited, Ordering::SeqCst);
    }

    fn check_limit(&self) -> Result<(), NodeError> {
        if self.inner.rate_limited.load(Ordering::SeqCst) {
            return Err(NodeError::RateLimited)
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl NodeRpc for MockNode {
    async fn transaction(&self, hash: TxHash) -> Result<Option<PendingTx>, NodeError> {
        self.check_limit()?;
        Ok(self.inner.txs.read().get(&hash).cloned())
    }

    async fn block(&self, number: u64, full: bool) -> Result<Option<FetchedBlock>, NodeError> {
        self.check_limit()?;
        Ok(self.inner.blocks.read().get(&number).map(|fetched| {
            let mut fetched = fetched.clone();
            if !full {
                fetched.txs.clear();
            }
            fetched
        }))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, NodeError> {
        self.check_limit()?;
        self.inner
            .calls
            .read()
            .get(&(to, data))
            .cloned()
            .ok_or_else(|| NodeError::Rpc("execution reverted".to_string()))
    }
}
