use alloy_primitives::{Address, Bytes, B256};

/// A canonical block as observed from the node.
///
/// Heads arrive without a transaction list; `transactions` is populated once
/// the block body has been fetched. Ordering matches the block.
#[derive(Debug, Clone, Default)]
pub struct ObservedBlock {
    pub number:           u64,
    pub hash:             B256,
    pub parent_hash:      B256,
    pub timestamp:        u64,
    pub miner:            Address,
    pub extra_data:       Bytes,
    pub gas_limit:        u64,
    pub gas_used:         u64,
    pub base_fee_per_gas: Option<u128>,
    pub transactions:     Vec<B256>
}
