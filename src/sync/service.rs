use std::time::Duration;

use tracing::{info, warn};

use super::client::WeddingClient;
use super::error::SyncError;
use crate::models::Wedding;
use crate::store::{MergeOutcome, StoreHandle};

/// Exponential backoff for retryable fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero based). Doubles each time.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Pulls the user's weddings from the API into the store.
pub struct SyncService {
    client: WeddingClient,
    store: StoreHandle,
    retry: RetryPolicy,
}

impl SyncService {
    pub fn new(client: WeddingClient, store: StoreHandle) -> Self {
        Self {
            client,
            store,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &WeddingClient {
        &self.client
    }

    /// Fetches, retrying transport failures according to the policy.
    pub async fn fetch(&self) -> Result<Vec<Wedding>, SyncError> {
        let mut attempt = 0;
        loop {
            match self.client.fetch_my_weddings().await {
                Ok(weddings) => return Ok(weddings),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.retry.max_retries,
                        ?delay,
                        "fetch failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Fetches the weddings and merges them into the store.
    ///
    /// The merge and its save are a single store operation, so dropping this
    /// future either discards everything (still fetching) or nothing (merge
    /// already handed to the store).
    pub async fn refresh(&self) -> Result<MergeOutcome, SyncError> {
        let weddings = self.fetch().await?;
        let count = weddings.len();
        let outcome = self.store.merge_weddings(weddings).await?;
        info!(weddings = count, %outcome, "refresh complete");
        Ok(outcome)
    }
}
