//! Timeout decorator for fetchers
//!
//! The loader imposes no timeout of its own; wrap the fetcher instead.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;

use crate::module::traits::ModuleFetcher;

/// Default timeout for one fetch batch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fails a batch that does not settle within the timeout
#[derive(Debug, Clone)]
pub struct TimeoutFetcher<F> {
    inner: F,
    timeout: Duration,
}

impl<F> TimeoutFetcher<F> {
    pub fn new(inner: F, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Wrap with [`DEFAULT_FETCH_TIMEOUT`]
    pub fn with_default_timeout(inner: F) -> Self {
        Self::new(inner, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<T, F> ModuleFetcher<T> for TimeoutFetcher<F>
where
    F: ModuleFetcher<T>,
    T: Send + 'static,
{
    async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<T>> {
        match timeout(self.timeout, self.inner.fetch_batch(identifiers)).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!(
                "Fetching {} modules timed out after {:?}",
                identifiers.len(),
                self.timeout
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::fetch::StaticFetcher;

    struct Slow;

    #[async_trait]
    impl ModuleFetcher<u8> for Slow {
        async fn fetch_batch(&self, identifiers: &[String]) -> anyhow::Result<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![0; identifiers.len()])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_batch_times_out() {
        let fetcher = TimeoutFetcher::new(Slow, Duration::from_secs(1));
        let err = fetcher.fetch_batch(&["a".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_fast_batch_passes_through() {
        let fetcher = TimeoutFetcher::with_default_timeout(StaticFetcher::new([("a", 7u8)]));
        assert_eq!(fetcher.timeout(), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(fetcher.fetch_batch(&["a".to_string()]).await.unwrap(), vec![7]);
    }
}
