//! Process-wide view of the node's pending transaction pool.
//!
//! [`MempoolState`] maps hashes to observed transactions; the
//! [`AnnotationCache`] memoizes decoded annotations with a TTL and LRU
//! touch. The [`MempoolManager`] task drives ingestion from the pending
//! stream: fetch the body through the rate limiter, ingest idempotently,
//! annotate opportunistically.

use std::time::Duration;

mod cache;
mod manager;
mod state;

pub use cache::AnnotationCache;
pub use manager::MempoolManager;
pub use state::MempoolState;

/// Pending transactions idle longer than this are evicted.
pub const MEMPOOL_TTL: Duration = Duration::from_secs(60 * 60);

/// Minimum lifetime of a cached annotation.
pub const ANNOTATION_TTL: Duration = Duration::from_secs(60 * 60);
