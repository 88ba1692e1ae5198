use std::collections::HashMap;

use alloy_primitives::Address;
use blockcast_types::{
    BlockComparison, BlockPrediction, ContractCacheEntry, PredictionMetadata
};
use parking_lot::RwLock;

use crate::traits::{Store, StoreError, StoreResult};

/// In-memory [`Store`]. Row ids are assigned from a monotonic counter; the
/// unique index on comparison block numbers is enforced the same way a
/// relational backend would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>
}

#[derive(Debug, Default)]
struct Inner {
    next_id:     u64,
    predictions: Vec<BlockPrediction>,
    comparisons: Vec<BlockComparison>,
    contracts:   HashMap<Address, ContractCacheEntry>,
    signatures:  HashMap<[u8; 4], String>
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn save_prediction(&self, mut prediction: BlockPrediction) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        let id = inner.next_id();
        prediction.id = Some(id);
        inner.predictions.push(prediction);
        Ok(id)
    }

    async fn update_prediction_metadata(
        &self,
        id: u64,
        metadata: PredictionMetadata
    ) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let row = inner
            .predictions
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| StoreError::NotFound(format!("prediction {id}")))?;
        row.metadata = Some(metadata);
        Ok(())
    }

    async fn save_comparison(&self, mut comparison: BlockComparison) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        if inner
            .comparisons
            .iter()
            .any(|c| c.block_number == comparison.block_number)
        {
            return Err(StoreError::Conflict(format!(
                "comparison for block {}",
                comparison.block_number
            )))
        }

        let id = inner.next_id();
        comparison.id = Some(id);
        inner.comparisons.push(comparison);
        Ok(id)
    }

    async fn recent_predictions(&self, n: usize) -> StoreResult<Vec<BlockPrediction>> {
        let inner = self.inner.read();
        Ok(inner.predictions.iter().rev().take(n).cloned().collect())
    }

    async fn prediction_count(&self) -> StoreResult<u64> {
        Ok(self.inner.read().predictions.len() as u64)
    }

    async fn recent_comparisons(&self, n: usize) -> StoreResult<Vec<BlockComparison>> {
        let inner = self.inner.read();
        Ok(inner.comparisons.iter().rev().take(n).cloned().collect())
    }

    async fn contract(&self, address: Address) -> StoreResult<Option<ContractCacheEntry>> {
        Ok(self.inner.read().contracts.get(&address).cloned())
    }

    async fn upsert_contract(&self, mut entry: ContractCacheEntry) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.contracts.get(&entry.address) {
            entry.call_count = existing.call_count;
        }
        inner.contracts.insert(entry.address, entry);
        Ok(())
    }

    async fn bump_contract_calls(&self, address: Address) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let entry = inner
            .contracts
            .entry(address)
            .or_insert_with(|| ContractCacheEntry::empty(address));
        entry.call_count += 1;
        Ok(())
    }

    async fn signature(&self, selector: [u8; 4]) -> StoreResult<Option<String>> {
        Ok(self.inner.read().signatures.get(&selector).cloned())
    }

    async fn save_signature(&self, selector: [u8; 4], name: &str) -> StoreResult<()> {
        self.inner.write().signatures.insert(selector, name.to_string());
        Ok(())
    }
}
