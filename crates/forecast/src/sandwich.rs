use std::{
    collections::VecDeque,
    time::{Duration, Instant}
};

use alloy_primitives::{Address, TxHash, U256};
use blockcast_types::PendingTx;
use itertools::Itertools;

/// How long an observed swap stays relevant for grouping.
pub const SANDWICH_WINDOW: Duration = Duration::from_secs(2);

/// 0.1 ETH. Smaller swaps are not worth sandwiching.
const MIN_TARGET_VALUE_WEI: u128 = 100_000_000_000_000_000;

/// A swap-typed transaction reduced to what grouping needs.
#[derive(Debug, Clone)]
pub struct SwapObservation {
    pub hash:         TxHash,
    pub pair:         (Address, Address),
    pub priority_fee: u128,
    pub value:        U256
}

impl SwapObservation {
    /// Builds an observation when the token pair can be sliced out of the
    /// calldata. Extraction failure exempts the swap from grouping.
    pub fn from_tx(tx: &PendingTx, base_fee: u128) -> Option<Self> {
        let pair = extract_token_pair(&tx.input)?;
        Some(Self {
            hash: tx.hash,
            pair,
            priority_fee: tx.effective_priority_fee(base_fee),
            value: tx.value
        })
    }
}

/// A detected (frontrun, target, backrun) candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandwichTriple {
    pub frontrun: TxHash,
    pub target:   TxHash,
    pub backrun:  TxHash
}

/// Token pair from router-style calldata: the 20-byte suffixes of the first
/// two ABI slots after the selector, sorted. Only shape-reliable for
/// V2-router-style layouts; anything else fails extraction.
pub fn extract_token_pair(input: &[u8]) -> Option<(Address, Address)> {
    if input.len() < 68 {
        return None
    }

    let a = Address::from_slice(&input[16..36]);
    let b = Address::from_slice(&input[48..68]);
    if a.is_zero() || b.is_zero() || a == b {
        return None
    }

    Some(if a < b { (a, b) } else { (b, a) })
}

/// Groups swaps on the same token pair inside a short sliding window and
/// flags high-value swaps bracketed by higher-fee companions.
#[derive(Debug, Default)]
pub struct SandwichDetector {
    window: VecDeque<(Instant, SwapObservation)>
}

impl SandwichDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current predicted swaps into the window and returns the
    /// candidate triples among everything still inside it.
    pub fn detect(&mut self, now: Instant, swaps: &[SwapObservation]) -> Vec<SandwichTriple> {
        self.window
            .retain(|(seen, _)| now.duration_since(*seen) <= SANDWICH_WINDOW);
        for swap in swaps {
            if !self.window.iter().any(|(_, known)| known.hash == swap.hash) {
                self.window.push_back((now, swap.clone()));
            }
        }

        let groups = self
            .window
            .iter()
            .map(|(_, swap)| swap)
            .into_group_map_by(|swap| swap.pair);

        let mut triples = Vec::new();
        for (_, mut group) in groups {
            if group.len() < 3 {
                continue
            }
            group.sort_by(|a, b| b.priority_fee.cmp(&a.priority_fee));

            let last = group.len() - 1;
            let min_value = U256::from(MIN_TARGET_VALUE_WEI);
            for i in 1..=last {
                if group[i].value < min_value {
                    continue
                }
                // the backrun is the cheapest other member; when the target
                // itself sits at the tail, the next-cheapest stands in
                let backrun = if i < last { group[last] } else { group[last - 1] };
                triples.push(SandwichTriple {
                    frontrun: group[0].hash,
                    target:   group[i].hash,
                    backrun:  backrun.hash
                });
            }
        }

        triples
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}
