use std::{collections::VecDeque, sync::Arc, time::Duration};

use blockcast_decode::Decoder;
use blockcast_mempool::{AnnotationCache, MempoolState};
use blockcast_node::{NodeEvent, NodeRpc};
use blockcast_storage::Store;
use blockcast_types::{units::DEFAULT_BLOCK_GAS_LIMIT, ObservedBlock};
use blockcast_utils::ShutdownSignal;
use futures::future::{BoxFuture, OptionFuture};
use parking_lot::Mutex;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{debug, info, trace};

use crate::{
    forecaster::{run_forecast, ForecastJob},
    oracle::{BaseFeeOracle, DEFAULT_BASE_FEE},
    predictions::{PredictionMap, PredictionRecord},
    reconcile::{reconcile_block, ReconcileJob},
    sandwich::SandwichDetector
};

#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Cadence of timer-driven forecasts, on top of one per new head.
    pub interval:    Duration,
    /// Forecasts for blocks this far behind the head are dropped.
    pub stale_depth: u64
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(3), stale_depth: 5 }
    }
}

/// Serializes forecasting and reconciliation over one task.
///
/// Forecast runs are reentrancy-guarded: a trigger while one is in flight
/// is dropped, the next tick picks up fresh state. Heads reconcile strictly
/// in block-number order; gaps are replayed by fetching the missing blocks.
pub struct ForecastManager<N> {
    events:   UnboundedReceiver<NodeEvent>,
    node:     N,
    mempool:  MempoolState,
    cache:    AnnotationCache,
    decoder:  Arc<Decoder<N>>,
    detector: Arc<Mutex<SandwichDetector>>,
    store:    Arc<dyn Store>,
    config:   ForecastConfig,
    shutdown: ShutdownSignal,

    oracle:      BaseFeeOracle,
    predictions: PredictionMap,
    head_number: Option<u64>,
    gas_limit:   u64,

    reconcile_cursor: Option<u64>,
    reconcile_queue:  VecDeque<u64>,

    forecast_inflight:  Option<BoxFuture<'static, PredictionRecord>>,
    reconcile_inflight: Option<BoxFuture<'static, Option<u64>>>
}

impl<N: NodeRpc> ForecastManager<N> {
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        events: UnboundedReceiver<NodeEvent>,
        node: N,
        mempool: MempoolState,
        cache: AnnotationCache,
        decoder: Arc<Decoder<N>>,
        store: Arc<dyn Store>,
        config: ForecastConfig,
        shutdown: ShutdownSignal
    ) -> JoinHandle<()> {
        let this = Self {
            events,
            node,
            mempool,
            cache,
            decoder,
            detector: Arc::new(Mutex::new(SandwichDetector::new())),
            store,
            config,
            shutdown,
            oracle: BaseFeeOracle::new(),
            predictions: PredictionMap::default(),
            head_number: None,
            gas_limit: DEFAULT_BLOCK_GAS_LIMIT,
            reconcile_cursor: None,
            reconcile_queue: VecDeque::new(),
            forecast_inflight: None,
            reconcile_inflight: None
        };
        tokio::spawn(this.run())
    }

    async fn run(mut self) {
        let mut tick = tokio::time::interval(self.config.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.wait() => break,

                event = self.events.recv() => match event {
                    None => break,
                    Some(event) => self.on_event(event)
                },

                _ = tick.tick() => self.maybe_forecast(),

                Some(record) = OptionFuture::from(self.forecast_inflight.as_mut()) => {
                    self.forecast_inflight = None;
                    self.on_forecast_complete(record);
                }

                Some(reconciled) = OptionFuture::from(self.reconcile_inflight.as_mut()) => {
                    self.reconcile_inflight = None;
                    if let Some(number) = reconciled {
                        trace!(target: "forecast", block = number, "reconciliation finished");
                    }
                    self.start_next_reconcile();
                }
            }
        }

        // let in-flight store writes land before returning
        if let Some(reconcile) = self.reconcile_inflight.take() {
            let _ = reconcile.await;
        }
        if let Some(forecast) = self.forecast_inflight.take() {
            let _ = forecast.await;
        }
        debug!(target: "forecast", "forecast manager stopped");
    }

    fn on_event(&mut self, event: NodeEvent) {
        match event {
            NodeEvent::NewHead(block) => self.on_new_head(block),
            NodeEvent::SessionReset => self.on_session_reset(),
            // ingestion is the mempool manager's concern
            NodeEvent::PendingTransaction(_) => {}
        }
    }

    fn on_new_head(&mut self, block: ObservedBlock) {
        // later heads cannot overtake earlier ones
        if self.reconcile_cursor.is_some_and(|cursor| block.number <= cursor) {
            debug!(target: "forecast", block = block.number, "stale head, ignoring");
            return
        }

        self.head_number = Some(block.number);
        self.gas_limit = block.gas_limit;
        if let Some(base_fee) = block.base_fee_per_gas {
            self.oracle.record(base_fee);
        }

        // enqueue the gap so missed heads replay in order
        let start = self.reconcile_cursor.map(|cursor| cursor + 1).unwrap_or(block.number);
        for number in start..=block.number {
            self.reconcile_queue.push_back(number);
        }
        self.reconcile_cursor = Some(block.number);

        let pruned = self
            .predictions
            .prune_through(block.number.saturating_sub(self.config.stale_depth));
        if pruned > 0 {
            debug!(target: "forecast", pruned, "dropped stale forecasts");
        }

        self.start_next_reconcile();
        self.maybe_forecast();
    }

    fn on_session_reset(&mut self) {
        info!(target: "forecast", "session reset, clearing forecast state");
        self.oracle.clear();
        self.predictions.clear();
        self.detector.lock().clear();
        self.head_number = None;
        self.gas_limit = DEFAULT_BLOCK_GAS_LIMIT;
        self.reconcile_cursor = None;
        self.reconcile_queue.clear();
        self.forecast_inflight = None;
        self.reconcile_inflight = None;
    }

    fn maybe_forecast(&mut self) {
        if self.forecast_inflight.is_some() {
            trace!(target: "forecast", "forecast already running, trigger dropped");
            return
        }
        let Some(head) = self.head_number else { return };
        if self.mempool.is_empty() {
            return
        }

        let job = ForecastJob {
            mempool:         self.mempool.clone(),
            cache:           self.cache.clone(),
            decoder:         self.decoder.clone(),
            detector:        self.detector.clone(),
            store:           self.store.clone(),
            target_block:    head + 1,
            next_base_fee:   self.oracle.estimate_next(),
            last_base_fee:   self.oracle.last_observed().unwrap_or(DEFAULT_BASE_FEE),
            block_gas_limit: self.gas_limit
        };
        self.forecast_inflight = Some(Box::pin(run_forecast(job)));
    }

    fn on_forecast_complete(&mut self, record: PredictionRecord) {
        info!(
            target: "forecast",
            block = record.block_number,
            txs = record.hashes.len(),
            gas_price_gwei = record.predicted_gas_price,
            "forecast registered"
        );
        // latest forecast for a block number wins
        self.predictions.insert(record);
    }

    fn start_next_reconcile(&mut self) {
        if self.reconcile_inflight.is_some() {
            return
        }
        let Some(number) = self.reconcile_queue.pop_front() else { return };

        let job = ReconcileJob {
            node:              self.node.clone(),
            store:             self.store.clone(),
            mempool:           self.mempool.clone(),
            cache:             self.cache.clone(),
            block_number:      number,
            prediction:        self.predictions.take(number),
            fallback_base_fee: self.oracle.last_observed().unwrap_or(DEFAULT_BASE_FEE)
        };
        self.reconcile_inflight = Some(Box::pin(reconcile_block(job)));
    }
}
