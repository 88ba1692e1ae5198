use alloy_primitives::TxHash;
use blockcast_types::ObservedBlock;

/// Events fanned out to registered listeners. Per-stream ordering is
/// preserved; ordering between the pending stream and the head stream is
/// not.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// A transaction hash entered the node's pending pool.
    PendingTransaction(TxHash),
    /// A new canonical head. Header fields only; the transaction list is
    /// fetched on demand.
    NewHead(ObservedBlock),
    /// A session was (re)established. Consumers must clear any state derived
    /// from the previous session's streams before processing later events.
    SessionReset
}
