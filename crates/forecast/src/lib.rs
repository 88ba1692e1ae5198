//! Next-block forecasting and post-block reconciliation.
//!
//! The pure pieces (base-fee oracle, packer, sandwich detector, accuracy
//! scoring) have no IO. The [`ForecastManager`] task serializes everything
//! stateful: it owns the oracle, the in-memory prediction map and the
//! reconciliation cursor, runs forecasts on a cadence behind a reentrancy
//! guard, and replays canonical heads strictly in order.

mod forecaster;
mod manager;
mod oracle;
mod packer;
mod predictions;
mod reconcile;
mod sandwich;
mod score;

pub use manager::{ForecastConfig, ForecastManager};
pub use oracle::BaseFeeOracle;
pub use packer::{pack, PackedForecast};
pub use predictions::{PredictionMap, PredictionRecord};
pub use sandwich::{extract_token_pair, SandwichDetector, SandwichTriple, SwapObservation};
pub use score::{score_prediction, Accuracy};
