use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::annotation::TxAnnotation;

/// A forecast for one future block number.
///
/// At most one prediction per block number is consulted at reconciliation
/// time (latest wins); earlier ones may be retained by the store for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPrediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id:                     Option<u64>,
    pub block_number:           u64,
    pub predicted_transactions: Vec<B256>,
    /// Average effective priority fee of the predicted set, in Gwei.
    pub predicted_gas_price:    f64,
    pub transaction_details:    HashMap<B256, TxAnnotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata:               Option<PredictionMetadata>,
    /// Unix seconds.
    pub created_at:             u64
}

/// Aggregate counts attached to a prediction after the fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionMetadata {
    /// Transaction count per protocol label.
    pub protocols:       BTreeMap<String, u32>,
    /// Transaction count per annotation type.
    pub kinds:           BTreeMap<String, u32>,
    /// Sum of predicted transaction values, decimal wei.
    pub total_value_wei: String
}

/// Write-once reconciliation record for a finalized block number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockComparison {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id:                     Option<u64>,
    pub block_number:           u64,
    pub predicted_transactions: Vec<B256>,
    pub actual_transactions:    Vec<B256>,
    /// Percentage in [0, 100].
    pub accuracy:               f64,
    pub miner:                  Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder:                Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_name:           Option<String>,
    /// Gwei. Inherited from the matched prediction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_gas_price:      Option<f64>,
    /// Unix seconds.
    pub timestamp:              u64
}
