//! `weddmate sync`: pull the user's weddings from the API.

use clap::Args;
use std::time::Duration;

use crate::config::{Config, ENV_API_TOKEN};
use crate::store::StoreHandle;
use crate::sync::{RetryPolicy, SyncError, SyncService, WeddingClient};

/// Sync with the WeddMate API
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Retries for transient network failures
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

impl SyncCommand {
    pub async fn run(&self, store: &StoreHandle, config: &Config) -> Result<(), SyncCommandError> {
        let service = self.service(store, config)?;

        println!("Syncing with {}...", service.client().base_url());
        let outcome = service.refresh().await?;

        if outcome.changed() == 0 {
            println!("Already up to date.");
        } else {
            println!("Sync complete: {}", outcome);
        }
        Ok(())
    }

    fn service(&self, store: &StoreHandle, config: &Config) -> Result<SyncService, SyncCommandError> {
        let token = config
            .api_token
            .value
            .clone()
            .ok_or(SyncCommandError::NotConfigured)?;

        let client = WeddingClient::with_base_url(config.api_url.value.clone(), token)
            .with_timeout(Duration::from_secs(self.timeout));
        let retry = RetryPolicy {
            max_retries: self.retries,
            ..RetryPolicy::default()
        };
        Ok(SyncService::new(client, store.clone()).with_retry(retry))
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    NotConfigured,
    SyncError(SyncError),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::NotConfigured => write!(
                f,
                "no API token configured; set api_token in the config file or {}",
                ENV_API_TOKEN
            ),
            SyncCommandError::SyncError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::NotConfigured => None,
            SyncCommandError::SyncError(e) => Some(e),
        }
    }
}

impl From<SyncError> for SyncCommandError {
    fn from(e: SyncError) -> Self {
        SyncCommandError::SyncError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sync_without_token_fails_before_network() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_with_env(Some(temp_dir.path().join("none.yaml")), |_| None)
            .unwrap();
        let store = Store::open(temp_dir.path().join("weddmate.db"))
            .await
            .unwrap();

        let cmd = SyncCommand {
            retries: 0,
            timeout: 1,
        };
        let err = cmd.run(&store, &config).await.unwrap_err();
        assert!(matches!(err, SyncCommandError::NotConfigured));
        assert!(err.to_string().contains(ENV_API_TOKEN));
    }
}
