//! Token-based mutual exclusion over the shared store.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{keys, Store};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    /// Attempts after the first one before giving up.
    pub retry_count: u32,
    pub retry_delay: Duration,
    /// Upper bound of the random delay added to every retry.
    pub retry_jitter: Duration,
    /// Lifetime of a held lock if its holder never releases it.
    pub ttl: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            retry_count: 10,
            retry_delay: Duration::from_millis(150),
            retry_jitter: Duration::from_millis(200),
            ttl: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct DistributedLock {
    store: Arc<dyn Store>,
    settings: LockSettings,
}

impl DistributedLock {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_settings(store, LockSettings::default())
    }

    pub fn with_settings(store: Arc<dyn Store>, settings: LockSettings) -> Self {
        Self { store, settings }
    }

    /// Acquire the lock on `resource`, retrying while someone else holds it.
    pub async fn acquire(&self, resource: &str) -> Result<LockGuard, AppError> {
        let key = keys::lock(resource);
        let token = Uuid::new_v4().to_string();
        let attempts = self.settings.retry_count + 1;

        for attempt in 1..=attempts {
            if self
                .store
                .set_nx_px(&key, &token, self.settings.ttl)
                .await?
            {
                debug!(resource, attempt, "Lock acquired");
                return Ok(LockGuard {
                    store: self.store.clone(),
                    key,
                    token,
                    released: false,
                });
            }

            if attempt < attempts {
                let jitter_ms = self.settings.retry_jitter.as_millis() as u64;
                let jitter = Duration::from_millis(rand::rng().random_range(0..=jitter_ms));
                sleep(self.settings.retry_delay + jitter).await;
            }
        }

        warn!(resource, attempts, "Lock acquisition failed");
        Err(AppError::LockAcquisitionFailed {
            resource: resource.to_string(),
            attempts,
        })
    }
}

/// A held lock. Expires on its own after the TTL if never released.
pub struct LockGuard {
    store: Arc<dyn Store>,
    key: String,
    token: String,
    released: bool,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Release the lock if this guard still owns it. Calling it again is a
    /// no-op.
    pub async fn release(&mut self) -> Result<(), AppError> {
        if self.released {
            return Ok(());
        }

        let removed = self.store.del_if_eq(&self.key, &self.token).await?;
        if !removed {
            warn!(key = %self.key, "Lock expired before release");
        }
        self.released = true;
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!(key = %self.key, "Lock guard dropped without release, waiting for TTL");
        }
    }
}
