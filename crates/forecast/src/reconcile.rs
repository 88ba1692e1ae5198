use std::{collections::HashMap, sync::Arc};

use blockcast_mempool::{AnnotationCache, MempoolState};
use blockcast_node::NodeRpc;
use blockcast_storage::{Store, StoreError};
use blockcast_types::{
    builder::extract_builder, units::unix_now, BlockComparison, PendingTx
};
use tracing::{debug, info, warn};

use crate::{predictions::PredictionRecord, score::score_prediction};

/// One block's reconciliation, captured when the head is dequeued.
pub(crate) struct ReconcileJob<N> {
    pub node:              N,
    pub store:             Arc<dyn Store>,
    pub mempool:           MempoolState,
    pub cache:             AnnotationCache,
    pub block_number:      u64,
    pub prediction:        Option<PredictionRecord>,
    /// Used for fee similarity when the block carries no base fee.
    pub fallback_base_fee: u128
}

/// Fetches the canonical block, scores the outstanding forecast if one
/// exists, persists the comparison, and cleans the mempool.
pub(crate) async fn reconcile_block<N: NodeRpc>(job: ReconcileJob<N>) -> Option<u64> {
    let fetched = match job.node.block(job.block_number, true).await {
        Ok(Some(fetched)) => fetched,
        Ok(None) => {
            warn!(target: "forecast", block = job.block_number, "canonical block not found");
            return None
        }
        Err(err) => {
            warn!(target: "forecast", block = job.block_number, %err, "block fetch failed");
            return None
        }
    };
    let block = fetched.block;
    let base_fee = block.base_fee_per_gas.unwrap_or(job.fallback_base_fee);

    if let Some(record) = job.prediction {
        let actual_txs: HashMap<_, PendingTx> =
            fetched.txs.into_iter().map(|tx| (tx.hash, tx)).collect();

        let accuracy = score_prediction(
            &record.hashes,
            &record.txs,
            &block.transactions,
            &actual_txs,
            base_fee
        );

        let builder = extract_builder(&block.extra_data);
        let comparison = BlockComparison {
            id:                     None,
            block_number:           block.number,
            predicted_transactions: record.hashes.clone(),
            actual_transactions:    block.transactions.clone(),
            accuracy:               accuracy.score,
            miner:                  block.miner,
            builder:                builder.map(|(signature, _)| signature.to_string()),
            builder_name:           Some(
                builder.map(|(_, name)| name).unwrap_or("unknown").to_string()
            ),
            average_gas_price:      Some(record.predicted_gas_price),
            timestamp:              unix_now()
        };

        match job.store.save_comparison(comparison).await {
            Ok(_) => {
                info!(
                    target: "forecast",
                    block = block.number,
                    accuracy = accuracy.score,
                    exact = accuracy.exact,
                    partial = accuracy.partial,
                    predicted = record.hashes.len(),
                    actual = block.transactions.len(),
                    "block reconciled"
                );
            }
            // the competing writer already persisted this block
            Err(StoreError::Conflict(_)) => {
                debug!(target: "forecast", block = block.number, "comparison already persisted");
            }
            Err(err) => {
                warn!(target: "forecast", block = block.number, %err, "comparison write failed");
            }
        }
    } else {
        debug!(
            target: "forecast",
            block = block.number,
            "no outstanding forecast for block, skipping comparison"
        );
    }

    // mempool cleanup happens whether or not a forecast existed
    let confirmed = job.mempool.confirm_block(&block.transactions);
    job.cache.remove(&block.transactions);
    debug!(
        target: "forecast",
        block = block.number,
        confirmed,
        remaining = job.mempool.len(),
        "confirmed mined transactions"
    );

    Some(block.number)
}
