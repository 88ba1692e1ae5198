use std::{
    future::Future,
    time::{Duration, Instant}
};

/// Times an async block, returning its output alongside the elapsed wall
/// clock.
pub async fn async_time_fn<F, Fut, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>
{
    let start = Instant::now();
    let out = f().await;
    (out, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_output_and_elapsed() {
        let (out, elapsed) = async_time_fn(|| async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            42
        })
        .await;

        assert_eq!(out, 42);
        assert!(elapsed >= Duration::from_millis(5));
    }
}
