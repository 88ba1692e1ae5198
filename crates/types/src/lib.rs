//! Core domain types shared across the blockcast workspace.
//!
//! Everything that crosses a component boundary lives here: observed
//! transactions and blocks, decoded annotations, forecasts and their
//! reconciliation records, plus the contract-registry cache entry. Fee and
//! value arithmetic stays in unsigned integers; floats only appear at
//! serialization boundaries (Gwei averages).

pub mod annotation;
pub mod block;
pub mod builder;
pub mod contract;
pub mod prediction;
pub mod tx;
pub mod units;

pub use annotation::{TxAnnotation, TxCategory, TxKind};
pub use block::ObservedBlock;
pub use contract::{ContractCacheEntry, ContractKind, TokenInfo};
pub use prediction::{BlockComparison, BlockPrediction, PredictionMetadata};
pub use tx::{PendingTx, TxStatus};
