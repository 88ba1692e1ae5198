use alloy::transports::{RpcError, TransportErrorKind};

/// Error surface for node interactions, split along the handling taxonomy:
/// transport-fatal errors trigger a reconnect, transient ones are logged and
/// skipped, rate limiting tells the caller to pause rather than tear down.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Connection-level failure. The session is torn down and rebuilt.
    #[error("transport failure: {0}")]
    Transport(String),
    /// A single call exceeded its deadline. The event is lost; no retry.
    #[error("rpc call timed out")]
    Timeout,
    /// The node is shedding load. Callers sleep or skip the operation.
    #[error("node rate limited the request")]
    RateLimited,
    /// No live session right now (connecting or backing off).
    #[error("not connected to the node")]
    Disconnected,
    /// The node answered with a non-rate-limit error payload.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// The manager task is gone; only seen during shutdown.
    #[error("node manager terminated")]
    Terminated
}

impl NodeError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Substrings nodes and gateways use for load shedding, checked against
/// error payload messages.
const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "too many request", "429"];

pub(crate) fn classify_rpc_error(err: RpcError<TransportErrorKind>) -> NodeError {
    match err {
        RpcError::ErrorResp(payload) => {
            let message = payload.message.to_lowercase();
            if payload.code == 429
                || payload.code == -32005
                || RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m))
            {
                NodeError::RateLimited
            } else {
                NodeError::Rpc(payload.to_string())
            }
        }
        RpcError::Transport(kind) => NodeError::Transport(kind.to_string()),
        other => NodeError::Rpc(other.to_string())
    }
}
