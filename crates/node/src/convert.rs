use std::time::Instant;

use alloy::rpc::types::{Block, Transaction};
use blockcast_types::{ObservedBlock, PendingTx, TxStatus};

use crate::traits::FetchedBlock;

pub(crate) fn tx_from_rpc(tx: Transaction) -> PendingTx {
    PendingTx {
        hash:                     tx.hash,
        from:                     tx.from,
        to:                       tx.to,
        value:                    tx.value,
        gas_limit:                tx.gas as u64,
        nonce:                    Some(tx.nonce),
        gas_price:                tx.gas_price,
        max_fee_per_gas:          tx.max_fee_per_gas,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        input:                    tx.input,
        first_seen:               Instant::now(),
        status:                   TxStatus::Pending
    }
}

pub(crate) fn block_from_rpc(block: Block) -> FetchedBlock {
    let header = &block.header;
    let observed = ObservedBlock {
        number:           header.number,
        hash:             header.hash,
        parent_hash:      header.parent_hash,
        timestamp:        header.timestamp,
        miner:            header.miner,
        extra_data:       header.extra_data.clone(),
        gas_limit:        header.gas_limit as u64,
        gas_used:         header.gas_used as u64,
        base_fee_per_gas: header.base_fee_per_gas.map(|fee| fee as u128),
        transactions:     block.transactions.hashes().collect()
    };

    let txs = block
        .transactions
        .as_transactions()
        .map(|txs| txs.iter().cloned().map(tx_from_rpc).collect())
        .unwrap_or_default();

    FetchedBlock { block: observed, txs }
}
