use std::{cmp::Reverse, collections::BTreeMap};

use blockcast_types::PendingTx;

/// Gas actually targeted, as a share of the block gas limit.
const TARGET_PCT: u128 = 95;
/// Headroom over the target tolerated before a transaction is refused.
const HARD_CAP_PCT: u128 = 114;

/// Result of one packing pass. Transactions are ordered by effective
/// priority fee descending, ties by first observation.
#[derive(Debug, Default)]
pub struct PackedForecast {
    pub txs:      Vec<PendingTx>,
    pub gas_used: u64,
    /// Integer average of the included effective priority fees, in wei.
    pub average_priority_fee: u128
}

/// Greedy fee-priority packing against a gas budget.
///
/// Fee viability is judged against `next_base_fee` with a lenient halved
/// floor; priority ordering is computed against `last_base_fee`, the fee the
/// current head actually charged. All arithmetic stays in integers.
pub fn pack(
    snapshot: Vec<PendingTx>,
    next_base_fee: u128,
    last_base_fee: u128,
    block_gas_limit: u64
) -> PackedForecast {
    let fee_floor = next_base_fee / 2;

    // group by effective priority fee, groups descending, arrival order
    // within a group
    let mut groups: BTreeMap<Reverse<u128>, Vec<PendingTx>> = BTreeMap::new();
    for tx in snapshot {
        if tx.max_fee() < fee_floor {
            continue
        }
        groups
            .entry(Reverse(tx.effective_priority_fee(last_base_fee)))
            .or_default()
            .push(tx);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|tx| tx.first_seen);
    }

    let target = block_gas_limit as u128 * TARGET_PCT / 100;
    let hard_cap = target * HARD_CAP_PCT / 100;

    let mut gas_used: u128 = 0;
    let mut txs = Vec::new();

    'packing: for group in groups.into_values() {
        for tx in group {
            if gas_used >= target {
                break 'packing
            }
            if gas_used + tx.gas_limit as u128 <= hard_cap {
                gas_used += tx.gas_limit as u128;
                txs.push(tx);
            }
        }
    }

    let average_priority_fee = if txs.is_empty() {
        0
    } else {
        txs.iter()
            .map(|tx| tx.effective_priority_fee(last_base_fee))
            .sum::<u128>()
            / txs.len() as u128
    };

    PackedForecast { txs, gas_used: gas_used as u64, average_priority_fee }
}
