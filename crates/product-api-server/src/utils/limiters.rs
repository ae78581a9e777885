use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::config::LimitsConfig;

/// Caps concurrent calls to the AI provider
#[derive(Clone)]
pub struct Limiters {
    llm_generate: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl Limiters {
    pub fn new(cfg: &LimitsConfig) -> Self {
        Self {
            llm_generate: Arc::new(Semaphore::new(cfg.llm_concurrency.max(1))),
            acquire_timeout: Duration::from_millis(cfg.acquire_timeout_ms.max(1)),
        }
    }

    /// Wait for an AI slot, giving up after the configured acquire timeout
    pub async fn acquire_llm(&self, op: &'static str) -> Result<OwnedSemaphorePermit> {
        let start = Instant::now();

        let permit = tokio::time::timeout(self.acquire_timeout, self.llm_generate.clone().acquire_owned())
            .await
            .map_err(|_| anyhow::anyhow!("Limiter acquire timeout for op={}", op))??;

        debug!("Acquired llm permit for op={} after {:?}", op, start.elapsed());
        Ok(permit)
    }

    pub fn available_llm_permits(&self) -> usize {
        self.llm_generate.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiters(concurrency: usize) -> Limiters {
        Limiters::new(&LimitsConfig {
            llm_concurrency: concurrency,
            acquire_timeout_ms: 20,
        })
    }

    #[tokio::test]
    async fn test_acquire_times_out_when_exhausted() {
        let limiters = limiters(1);

        let held = limiters.acquire_llm("test").await.unwrap();
        assert_eq!(limiters.available_llm_permits(), 0);
        assert!(limiters.acquire_llm("test").await.is_err());

        drop(held);
        assert!(limiters.acquire_llm("test").await.is_ok());
    }

    #[test]
    fn test_zero_concurrency_still_allows_one_call() {
        assert_eq!(limiters(0).available_llm_permits(), 1);
    }
}
