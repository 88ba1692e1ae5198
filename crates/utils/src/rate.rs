use std::{future::Future, sync::Arc};

use tokio::sync::Semaphore;

/// Bounds the number of concurrent in-flight node calls.
///
/// A token pool over a fair semaphore: waiters are served FIFO. One limiter
/// instance is shared by every component that issues on-demand RPC.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    permits: Arc<Semaphore>
}

impl RateLimiter {
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 50;

    pub fn new(max_in_flight: usize) -> Self {
        Self { permits: Arc::new(Semaphore::new(max_in_flight)) }
    }

    /// Runs `fut` once a token is available, queueing behind earlier callers.
    /// The token is released when the future completes, on success and
    /// failure alike.
    pub async fn submit<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("rate limiter semaphore never closed");
        fut.await
    }

    /// Runs `fut` only if a token is free right now. Used for droppable work
    /// that should back off under pressure instead of queueing.
    pub async fn try_submit<F, T>(&self, fut: F) -> Option<T>
    where
        F: Future<Output = T>
    {
        let _permit = self.permits.try_acquire().ok()?;
        Some(fut.await)
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_IN_FLIGHT)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn bounds_concurrency() {
        let limiter = RateLimiter::new(2);

        let _a = limiter.permits.clone().acquire_owned().await.unwrap();
        let _b = limiter.permits.clone().acquire_owned().await.unwrap();

        // pool exhausted: droppable work is refused
        assert!(limiter.try_submit(async { 1 }).await.is_none());

        drop(_a);
        assert_eq!(limiter.try_submit(async { 1 }).await, Some(1));
    }

    #[tokio::test]
    async fn submit_queues_until_token_free() {
        let limiter = RateLimiter::new(1);
        let held = limiter.permits.clone().acquire_owned().await.unwrap();

        let queued = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.submit(async { 7 }).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!queued.is_finished());

        drop(held);
        assert_eq!(queued.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn token_released_after_completion() {
        let limiter = RateLimiter::new(1);
        limiter.submit(async {}).await;
        assert_eq!(limiter.available(), 1);
    }
}
