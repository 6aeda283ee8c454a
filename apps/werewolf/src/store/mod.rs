//! Shared state store: key/value, hash, set and sorted-set storage plus a
//! per-channel pub/sub bus.
//!
//! Every component that needs shared state goes through [`Store`]. The two
//! backends are [`RedisStore`] for deployments and [`MemoryStore`] for tests
//! and single-process runs.

pub mod keys;
pub mod lock;
pub mod memory;
pub mod redis;

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

pub use self::lock::{DistributedLock, LockGuard, LockSettings};
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;
use crate::error::AppError;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    /// Returns whether the key existed.
    async fn del(&self, key: &str) -> Result<bool, AppError>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError>;
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), AppError>;
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, AppError>;
    /// Returns whether the field existed.
    async fn hdel(&self, key: &str, field: &str) -> Result<bool, AppError>;
    async fn hlen(&self, key: &str) -> Result<usize, AppError>;

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), AppError>;
    /// All members, lowest score first.
    async fn zrange(&self, key: &str) -> Result<Vec<String>, AppError>;

    async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError>;
    async fn srem(&self, key: &str, member: &str) -> Result<(), AppError>;
    async fn smembers(&self, key: &str) -> Result<Vec<String>, AppError>;

    /// Keys starting with `prefix`, in no particular order.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError>;

    /// Set `key` to `value` only if it does not exist, expiring after `ttl`.
    async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, AppError>;
    /// Delete `key` only if it currently holds `value`.
    async fn del_if_eq(&self, key: &str, value: &str) -> Result<bool, AppError>;

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), AppError>;
    /// The subscription is live when this returns: anything published after
    /// that point is delivered.
    async fn subscribe(&self, channel: &str) -> Result<Subscription, AppError>;
}

/// Raw payloads received on one channel, in publish order.
///
/// Dropping the subscription detaches it from the channel.
pub struct Subscription {
    channel: String,
    inner: Pin<Box<dyn Stream<Item = String> + Send>>,
}

impl Subscription {
    pub fn new(channel: impl Into<String>, stream: impl Stream<Item = String> + Send + 'static) -> Self {
        Self {
            channel: channel.into(),
            inner: Box::pin(stream),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next payload, or `None` once the channel is gone.
    pub async fn next(&mut self) -> Option<String> {
        self.inner.next().await
    }

    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
