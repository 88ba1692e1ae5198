//! Session management for the single execution-node connection.
//!
//! One [`NodeManager`] task owns the WebSocket session and multiplexes the
//! `newPendingTransactions` and `newHeads` subscriptions into listener
//! channels. On-demand RPC (`eth_getTransactionByHash`,
//! `eth_getBlockByNumber`, `eth_call`) goes through the [`NodeHandle`]
//! command channel and runs against the live provider with a bounded
//! timeout. Transport failure tears the session down and reopens it after a
//! 5 second delay, doubling to 10 seconds on repeated failure; every
//! successful (re)connect emits [`NodeEvent::SessionReset`] so consumers
//! drop stream-derived state.

mod convert;
mod error;
mod events;
mod handle;
mod manager;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::NodeError;
pub use events::NodeEvent;
pub use handle::{NodeCommand, NodeHandle};
pub use manager::NodeManager;
pub use traits::{FetchedBlock, NodeRpc};
