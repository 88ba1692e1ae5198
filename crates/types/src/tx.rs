use std::time::Instant;

use alloy_primitives::{Address, Bytes, TxHash, U256};

/// Lifecycle of an observed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxStatus {
    #[default]
    Pending,
    Included,
    Failed
}

/// A transaction observed in the mempool but not yet mined.
///
/// Fee fields follow the wire: legacy transactions carry `gas_price`,
/// EIP-1559 transactions carry the fee cap pair. `first_seen` is a local
/// monotonic timestamp used for TTL eviction and packing tie-breaks.
#[derive(Debug, Clone)]
pub struct PendingTx {
    pub hash:                     TxHash,
    pub from:                     Address,
    pub to:                       Option<Address>,
    pub value:                    U256,
    pub gas_limit:                u64,
    pub nonce:                    Option<u64>,
    pub gas_price:                Option<u128>,
    pub max_fee_per_gas:          Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub input:                    Bytes,
    pub first_seen:               Instant,
    pub status:                   TxStatus
}

impl PendingTx {
    /// First four bytes of calldata, when present.
    pub fn selector(&self) -> Option<[u8; 4]> {
        (self.input.len() >= 4).then(|| self.input[..4].try_into().expect("len checked"))
    }

    pub fn is_eip1559(&self) -> bool {
        self.max_fee_per_gas.is_some()
    }

    /// The most this transaction is willing to pay per gas. EIP-1559
    /// transactions without a fee cap fall back to their gas price.
    pub fn max_fee(&self) -> u128 {
        self.max_fee_per_gas.or(self.gas_price).unwrap_or(0)
    }

    /// Fee per gas actually paid to the proposer given `base_fee`.
    ///
    /// EIP-1559: `min(priority_fee, max_fee - base_fee)`, floored at zero.
    /// Legacy: a tenth of the gas price, the share treated as tip.
    pub fn effective_priority_fee(&self, base_fee: u128) -> u128 {
        match (self.max_fee_per_gas, self.gas_price) {
            (Some(max_fee), _) => {
                let headroom = max_fee.saturating_sub(base_fee);
                self.max_priority_fee_per_gas.unwrap_or(max_fee).min(headroom)
            }
            (None, Some(gas_price)) => gas_price / 10,
            (None, None) => 0
        }
    }
}
