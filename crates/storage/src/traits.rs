use alloy_primitives::Address;
use blockcast_types::{
    BlockComparison, BlockPrediction, ContractCacheEntry, PredictionMetadata
};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique index rejected the write; the competing writer already
    /// persisted the record.
    #[error("conflicting write for {0}")]
    Conflict(String),
    #[error("row not found: {0}")]
    NotFound(String),
    #[error("store backend failure: {0}")]
    Backend(String)
}

/// Narrow persistence surface the core depends on.
///
/// Writes to the same row must behave as upserts; `save_comparison` is
/// serialized by a unique index on the block number.
#[async_trait::async_trait]
pub trait Store: Send + Sync + 'static {
    async fn save_prediction(&self, prediction: BlockPrediction) -> StoreResult<u64>;

    async fn update_prediction_metadata(
        &self,
        id: u64,
        metadata: PredictionMetadata
    ) -> StoreResult<()>;

    async fn save_comparison(&self, comparison: BlockComparison) -> StoreResult<u64>;

    async fn recent_predictions(&self, n: usize) -> StoreResult<Vec<BlockPrediction>>;

    async fn prediction_count(&self) -> StoreResult<u64>;

    async fn recent_comparisons(&self, n: usize) -> StoreResult<Vec<BlockComparison>>;

    async fn contract(&self, address: Address) -> StoreResult<Option<ContractCacheEntry>>;

    /// Inserts or replaces the entry for `entry.address`, preserving the
    /// stored `call_count` so concurrent first-fetches converge.
    async fn upsert_contract(&self, entry: ContractCacheEntry) -> StoreResult<()>;

    async fn bump_contract_calls(&self, address: Address) -> StoreResult<()>;

    async fn signature(&self, selector: [u8; 4]) -> StoreResult<Option<String>>;

    async fn save_signature(&self, selector: [u8; 4], name: &str) -> StoreResult<()>;
}
