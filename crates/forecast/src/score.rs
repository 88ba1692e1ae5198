use std::collections::{HashMap, HashSet};

use alloy_primitives::{TxHash, U256};
use blockcast_types::PendingTx;

/// Outcome of scoring one prediction against the canonical block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accuracy {
    pub exact:   usize,
    pub partial: usize,
    /// Percentage in [0, 100].
    pub score:   f64
}

/// Exact matches are shared hashes. A predicted miss earns a partial match
/// when some unmatched actual transaction looks like the same intent: same
/// callee, priority fees within 10%, values within 5%, same selector. Each
/// predicted hash earns at most one partial, each actual transaction is
/// consumed at most once.
pub fn score_prediction(
    predicted: &[TxHash],
    predicted_txs: &HashMap<TxHash, PendingTx>,
    actual: &[TxHash],
    actual_txs: &HashMap<TxHash, PendingTx>,
    base_fee: u128
) -> Accuracy {
    if predicted.is_empty() {
        return Accuracy { exact: 0, partial: 0, score: 0.0 }
    }

    let actual_set: HashSet<&TxHash> = actual.iter().collect();
    let predicted_set: HashSet<&TxHash> = predicted.iter().collect();

    let exact = predicted.iter().filter(|hash| actual_set.contains(hash)).count();

    let mut candidates: Vec<&PendingTx> = actual
        .iter()
        .filter(|hash| !predicted_set.contains(hash))
        .filter_map(|hash| actual_txs.get(hash))
        .collect();

    let mut partial = 0;
    for hash in predicted.iter().filter(|hash| !actual_set.contains(hash)) {
        let Some(miss) = predicted_txs.get(hash) else { continue };
        if let Some(found) = candidates.iter().position(|tx| similar(miss, tx, base_fee)) {
            candidates.swap_remove(found);
            partial += 1;
        }
    }

    let raw = (exact * 100 + partial * 50) as f64 / predicted.len() as f64;
    Accuracy { exact, partial, score: raw.clamp(0.0, 100.0) }
}

fn similar(a: &PendingTx, b: &PendingTx, base_fee: u128) -> bool {
    a.to == b.to
        && a.selector() == b.selector()
        && within_pct(
            a.effective_priority_fee(base_fee),
            b.effective_priority_fee(base_fee),
            10
        )
        && value_within_pct(a.value, b.value, 5)
}

/// Relative to the larger of the two; equal zeros pass.
fn within_pct(a: u128, b: u128, pct: u128) -> bool {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == 0 {
        return true
    }
    (hi - lo).saturating_mul(100) <= hi.saturating_mul(pct)
}

fn value_within_pct(a: U256, b: U256, pct: u64) -> bool {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi.is_zero() {
        return true
    }
    // divide first so the comparison cannot overflow
    hi - lo <= hi / U256::from(100u8) * U256::from(pct)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use alloy_primitives::{Address, Bytes, B256};
    use blockcast_types::TxStatus;

    use super::*;

    const GWEI: u128 = 1_000_000_000;

    fn tx(hash: u8, to: u8, priority: u128, value: u128, selector: [u8; 4]) -> PendingTx {
        PendingTx {
            hash: B256::with_last_byte(hash),
            from: Address::with_last_byte(1),
            to: Some(Address::with_last_byte(to)),
            value: U256::from(value),
            gas_limit: 50_000,
            nonce: Some(0),
            gas_price: None,
            max_fee_per_gas: Some(priority + 100 * GWEI),
            max_priority_fee_per_gas: Some(priority),
            input: Bytes::from(selector.to_vec()),
            first_seen: Instant::now(),
            status: TxStatus::Pending
        }
    }

    fn by_hash(txs: &[PendingTx]) -> HashMap<TxHash, PendingTx> {
        txs.iter().map(|tx| (tx.hash, tx.clone())).collect()
    }

    fn hashes(ids: &[u8]) -> Vec<TxHash> {
        ids.iter().map(|id| B256::with_last_byte(*id)).collect()
    }

    #[test]
    fn perfect_prediction_scores_100() {
        let txs: Vec<_> = (1..=3)
            .map(|i| tx(i, 9, 2 * GWEI, 1_000, [0xaa, 0xbb, 0xcc, 0xdd]))
            .collect();
        let map = by_hash(&txs);

        // set equality, not order
        let accuracy =
            score_prediction(&hashes(&[1, 2, 3]), &map, &hashes(&[3, 1, 2]), &map, 10 * GWEI);
        assert_eq!(accuracy.exact, 3);
        assert_eq!(accuracy.score, 100.0);
    }

    #[test]
    fn disjoint_and_dissimilar_scores_0() {
        let predicted = [tx(1, 9, 2 * GWEI, 1_000, [1, 1, 1, 1])];
        let actual = [tx(4, 7, 50 * GWEI, 999_999_999, [2, 2, 2, 2])];

        let accuracy = score_prediction(
            &hashes(&[1]),
            &by_hash(&predicted),
            &hashes(&[4]),
            &by_hash(&actual),
            10 * GWEI
        );
        assert_eq!(accuracy.score, 0.0);
    }

    #[test]
    fn partial_match_scores_half() {
        // predicted P1,P2,P3; actual P1,X,Y where X mirrors P2
        let p1 = tx(1, 9, 2 * GWEI, 1_000, [1, 1, 1, 1]);
        let p2 = tx(2, 8, 2 * GWEI, 1_000, [3, 3, 3, 3]);
        let p3 = tx(3, 7, 2 * GWEI, 1_000, [4, 4, 4, 4]);
        let x = tx(4, 8, 2 * GWEI, 1_000, [3, 3, 3, 3]);
        let y = tx(5, 6, 9 * GWEI, 5, [5, 5, 5, 5]);

        let accuracy = score_prediction(
            &hashes(&[1, 2, 3]),
            &by_hash(&[p1.clone(), p2, p3]),
            &hashes(&[1, 4, 5]),
            &by_hash(&[p1, x, y]),
            10 * GWEI
        );

        assert_eq!(accuracy.exact, 1);
        assert_eq!(accuracy.partial, 1);
        assert_eq!(accuracy.score, 50.0);
    }

    #[test]
    fn actual_consumed_at_most_once() {
        // two predicted misses resembling the same single actual
        let p1 = tx(1, 8, 2 * GWEI, 1_000, [3, 3, 3, 3]);
        let p2 = tx(2, 8, 2 * GWEI, 1_000, [3, 3, 3, 3]);
        let x = tx(4, 8, 2 * GWEI, 1_000, [3, 3, 3, 3]);

        let accuracy = score_prediction(
            &hashes(&[1, 2]),
            &by_hash(&[p1, p2]),
            &hashes(&[4]),
            &by_hash(&[x]),
            10 * GWEI
        );

        assert_eq!(accuracy.partial, 1);
        assert_eq!(accuracy.score, 25.0);
    }

    #[test]
    fn fee_tolerance_is_ten_percent() {
        let p = tx(1, 8, 100 * GWEI, 1_000, [3, 3, 3, 3]);
        let close = tx(4, 8, 91 * GWEI, 1_000, [3, 3, 3, 3]);
        let far = tx(5, 8, 80 * GWEI, 1_000, [3, 3, 3, 3]);

        let accuracy = score_prediction(
            &hashes(&[1]),
            &by_hash(&[p.clone()]),
            &hashes(&[4]),
            &by_hash(&[close]),
            10 * GWEI
        );
        assert_eq!(accuracy.partial, 1);

        let accuracy = score_prediction(
            &hashes(&[1]),
            &by_hash(&[p]),
            &hashes(&[5]),
            &by_hash(&[far]),
            10 * GWEI
        );
        assert_eq!(accuracy.partial, 0);
    }

    #[test]
    fn empty_prediction_scores_0() {
        let accuracy =
            score_prediction(&[], &HashMap::new(), &hashes(&[1]), &HashMap::new(), GWEI);
        assert_eq!(accuracy.score, 0.0);
    }
}
