use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Instant
};

use alloy_primitives::{TxHash, U256};
use blockcast_decode::Decoder;
use blockcast_mempool::{AnnotationCache, MempoolState};
use blockcast_node::NodeRpc;
use blockcast_storage::Store;
use blockcast_types::{
    units::{unix_now, wei_to_gwei},
    BlockPrediction, PendingTx, PredictionMetadata, TxCategory, TxKind
};
use blockcast_utils::async_time_fn;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    packer::pack,
    predictions::PredictionRecord,
    sandwich::{SandwichDetector, SandwichTriple, SwapObservation}
};

/// Everything one forecast run needs, captured at trigger time.
pub(crate) struct ForecastJob<N> {
    pub mempool:         MempoolState,
    pub cache:           AnnotationCache,
    pub decoder:         Arc<Decoder<N>>,
    pub detector:        Arc<Mutex<SandwichDetector>>,
    pub store:           Arc<dyn Store>,
    pub target_block:    u64,
    pub next_base_fee:   u128,
    pub last_base_fee:   u128,
    pub block_gas_limit: u64
}

/// One forecast: pack, detect sandwiches, annotate, persist, and hand back
/// the record the reconciler will score against.
pub(crate) async fn run_forecast<N: NodeRpc>(job: ForecastJob<N>) -> PredictionRecord {
    let target = job.target_block;
    let (record, elapsed) = async_time_fn(|| build_forecast(job)).await;
    debug!(
        target: "forecast",
        block = target,
        txs = record.hashes.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "forecast built"
    );
    record
}

async fn build_forecast<N: NodeRpc>(job: ForecastJob<N>) -> PredictionRecord {
    let packed = pack(
        job.mempool.snapshot(),
        job.next_base_fee,
        job.last_base_fee,
        job.block_gas_limit
    );

    // annotations: cache hit or synthesized through the rate-limited decoder
    let mut details = HashMap::with_capacity(packed.txs.len());
    for tx in &packed.txs {
        let annotation = match job.cache.get(&tx.hash) {
            Some(annotation) => annotation,
            None => {
                let annotation = job.decoder.annotate(tx).await;
                job.cache.insert(tx.hash, annotation.clone());
                annotation
            }
        };
        details.insert(tx.hash, annotation);
    }

    let swaps: Vec<SwapObservation> = packed
        .txs
        .iter()
        .filter(|tx| {
            details
                .get(&tx.hash)
                .is_some_and(|annotation| annotation.kind == TxKind::Swap)
        })
        .filter_map(|tx| SwapObservation::from_tx(tx, job.last_base_fee))
        .collect();
    let triples = job.detector.lock().detect(Instant::now(), &swaps);

    let mut order: Vec<TxHash> = packed.txs.iter().map(|tx| tx.hash).collect();
    let mut bodies: HashMap<TxHash, PendingTx> =
        packed.txs.into_iter().map(|tx| (tx.hash, tx)).collect();

    for triple in &triples {
        if !materialize_triple(triple, &mut bodies, &job.mempool) {
            debug!(target: "forecast", ?triple, "sandwich member missing from mempool, skipped");
            continue
        }
        apply_triple(&mut order, triple);

        for hash in [triple.frontrun, triple.target, triple.backrun] {
            let annotation = details.entry(hash).or_default();
            annotation.kind = TxKind::Sandwich;
            if annotation.category == TxCategory::Other {
                annotation.category = TxCategory::Dex;
            }
            if hash == triple.target {
                annotation.is_sandwich_target = true;
            }
        }
    }

    // gwei only at the serialization boundary
    let average_priority_fee = average_priority_fee(&order, &bodies, job.last_base_fee);
    let predicted_gas_price = wei_to_gwei(average_priority_fee);

    let prediction = BlockPrediction {
        id:                     None,
        block_number:           job.target_block,
        predicted_transactions: order.clone(),
        predicted_gas_price,
        transaction_details:    details.clone(),
        metadata:               Some(build_metadata(&order, &bodies, &details)),
        created_at:             unix_now()
    };

    let id = match job.store.save_prediction(prediction).await {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(target: "forecast", block = job.target_block, %err, "prediction write failed");
            None
        }
    };

    PredictionRecord {
        id,
        block_number: job.target_block,
        hashes: order,
        txs: bodies,
        predicted_gas_price
    }
}

/// Ensures all three members have bodies available, pulling inserted ones
/// out of the mempool.
fn materialize_triple(
    triple: &SandwichTriple,
    bodies: &mut HashMap<TxHash, PendingTx>,
    mempool: &MempoolState
) -> bool {
    for hash in [triple.frontrun, triple.target, triple.backrun] {
        if bodies.contains_key(&hash) {
            continue
        }
        match mempool.get(&hash) {
            Some(tx) => {
                bodies.insert(hash, tx);
            }
            None => return false
        }
    }
    true
}

/// Rewrites the order so the triple appears contiguously as
/// frontrun, target, backrun, anchored where its first member sat.
fn apply_triple(order: &mut Vec<TxHash>, triple: &SandwichTriple) {
    let members = [triple.frontrun, triple.target, triple.backrun];
    let anchor = order
        .iter()
        .position(|hash| members.contains(hash))
        .unwrap_or(order.len());

    order.retain(|hash| !members.contains(hash));
    let anchor = anchor.min(order.len());
    order.splice(anchor..anchor, members);
}

fn average_priority_fee(
    order: &[TxHash],
    bodies: &HashMap<TxHash, PendingTx>,
    base_fee: u128
) -> u128 {
    let fees: Vec<u128> = order
        .iter()
        .filter_map(|hash| bodies.get(hash))
        .map(|tx| tx.effective_priority_fee(base_fee))
        .collect();
    if fees.is_empty() {
        return 0
    }
    fees.iter().sum::<u128>() / fees.len() as u128
}

fn build_metadata(
    order: &[TxHash],
    bodies: &HashMap<TxHash, PendingTx>,
    details: &HashMap<TxHash, blockcast_types::TxAnnotation>
) -> PredictionMetadata {
    let mut protocols: BTreeMap<String, u32> = BTreeMap::new();
    let mut kinds: BTreeMap<String, u32> = BTreeMap::new();
    let mut total_value = U256::ZERO;

    for hash in order {
        if let Some(annotation) = details.get(hash) {
            *kinds.entry(annotation.kind.as_str().to_string()).or_default() += 1;
            if let Some(protocol) = &annotation.protocol {
                *protocols.entry(protocol.clone()).or_default() += 1;
            }
        }
        if let Some(tx) = bodies.get(hash) {
            total_value += tx.value;
        }
    }

    PredictionMetadata { protocols, kinds, total_value_wei: total_value.to_string() }
}
