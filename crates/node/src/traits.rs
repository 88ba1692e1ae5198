use alloy_primitives::{Address, Bytes, TxHash};
use blockcast_types::{ObservedBlock, PendingTx};

use crate::error::NodeError;

/// A block fetched on demand. `txs` is populated only when the block was
/// requested with full transactions.
#[derive(Debug, Clone, Default)]
pub struct FetchedBlock {
    pub block: ObservedBlock,
    pub txs:   Vec<PendingTx>
}

/// On-demand RPC surface the decoding and forecasting layers depend on.
///
/// Implemented by [`NodeHandle`](crate::NodeHandle) against the live
/// session, and by the mock in `test_utils` for tests.
#[async_trait::async_trait]
pub trait NodeRpc: Send + Sync + Clone + 'static {
    async fn transaction(&self, hash: TxHash) -> Result<Option<PendingTx>, NodeError>;

    async fn block(&self, number: u64, full: bool) -> Result<Option<FetchedBlock>, NodeError>;

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, NodeError>;
}
