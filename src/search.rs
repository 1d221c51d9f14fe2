//! Quota-aware search on the destination service.
//!
//! [`QuotaAwareSearch`] wraps a raw [`SearchTransport`] with the retry rules
//! of a [`RetryPolicy`]:
//!
//! - rate-limit responses back off exponentially and, once the attempts are
//!   used up, surface as [`SyncError::QuotaExceeded`]
//! - transient failures are retried once
//! - fatal failures are returned immediately
//!
//! The policy is plain configuration handed to the constructor; the client
//! keeps no state between calls.

use std::{future::Future, time::Duration};

use tokio::time::sleep;

use crate::{error::SyncError, sync::TrackSearch, types::SearchCandidate};

/// One search request against the destination, without any retry.
pub trait SearchTransport {
    fn search_once(
        &self,
        query: &str,
        max_results: u32,
    ) -> impl Future<Output = Result<Vec<SearchCandidate>, SyncError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Rate-limited attempts before giving up, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay.max(base_delay);
        self
    }

    /// Delay after the `attempt`-th rate-limited response (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Runs `op` until it succeeds or the policy gives up.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let mut rate_limited = 0;
        let mut transient_retried = false;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(SyncError::RateLimited { retry_after }) => {
                    rate_limited += 1;
                    if rate_limited >= self.max_attempts {
                        return Err(SyncError::QuotaExceeded {
                            attempts: rate_limited,
                        });
                    }
                    let delay = retry_after
                        .map(|d| d.min(self.max_delay))
                        .unwrap_or_else(|| self.backoff(rate_limited));
                    sleep(delay).await;
                }
                Err(SyncError::Transient(_)) if !transient_retried => {
                    transient_retried = true;
                    sleep(self.base_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Search client that caps results and applies a [`RetryPolicy`].
pub struct QuotaAwareSearch<T> {
    transport: T,
    policy: RetryPolicy,
    max_results: u32,
}

impl<T: SearchTransport> QuotaAwareSearch<T> {
    pub fn new(transport: T, policy: RetryPolicy, max_results: u32) -> Self {
        Self {
            transport,
            policy,
            max_results: max_results.max(1),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Searches `query`, returning at most `max_results` candidates in the
    /// destination's relevance order.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, SyncError> {
        let transport = &self.transport;
        let max_results = self.max_results;

        let mut candidates = self
            .policy
            .run(move || transport.search_once(query, max_results))
            .await?;
        candidates.truncate(max_results as usize);
        Ok(candidates)
    }
}

impl<T: SearchTransport> TrackSearch for QuotaAwareSearch<T> {
    async fn search(&self, query: &str) -> Result<Vec<SearchCandidate>, SyncError> {
        QuotaAwareSearch::search(self, query).await
    }
}
