use std::collections::HashMap;

use alloy_primitives::TxHash;
use blockcast_types::PendingTx;

/// What reconciliation needs from a forecast: the ordered hashes plus the
/// predicted transactions' attributes, kept here so partial-match scoring
/// does not depend on the mempool still holding them.
#[derive(Debug, Clone)]
pub struct PredictionRecord {
    pub id:                  Option<u64>,
    pub block_number:        u64,
    pub hashes:              Vec<TxHash>,
    pub txs:                 HashMap<TxHash, PendingTx>,
    /// Gwei average carried into the comparison record.
    pub predicted_gas_price: f64
}

/// Outstanding forecasts keyed by block number. Owned by the forecast
/// manager task; the single-writer rule makes a lock unnecessary.
#[derive(Debug, Default)]
pub struct PredictionMap {
    inner: HashMap<u64, PredictionRecord>
}

impl PredictionMap {
    /// Registers a forecast. A later forecast for the same block number
    /// replaces the earlier one: the latest wins.
    pub fn insert(&mut self, record: PredictionRecord) {
        self.inner.insert(record.block_number, record);
    }

    /// Removes and returns the forecast for a block, if any.
    pub fn take(&mut self, block_number: u64) -> Option<PredictionRecord> {
        self.inner.remove(&block_number)
    }

    /// Drops forecasts for blocks at or below `cutoff`.
    pub fn prune_through(&mut self, cutoff: u64) -> usize {
        let before = self.inner.len();
        self.inner.retain(|number, _| *number > cutoff);
        before - self.inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
