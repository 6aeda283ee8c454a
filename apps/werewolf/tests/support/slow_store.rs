//! Store wrapper that makes phase writes slow, widening the gap between a
//! phase ending and the next one being stored.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use werewolf::store::Subscription;
use werewolf::{AppError, MemoryStore, Store};

pub struct SlowPhaseStore {
    inner: MemoryStore,
    latency: Duration,
}

impl SlowPhaseStore {
    pub fn new(inner: MemoryStore, latency: Duration) -> Self {
        Self { inner, latency }
    }
}

#[async_trait]
impl Store for SlowPhaseStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        if key.ends_with(":phase") {
            tokio::time::sleep(self.latency).await;
        }
        self.inner.set(key, value).await
    }

    async fn del(&self, key: &str) -> Result<bool, AppError> {
        self.inner.del(key).await
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        self.inner.hget(key, field).await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), AppError> {
        self.inner.hset(key, field, value).await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, AppError> {
        self.inner.hgetall(key).await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool, AppError> {
        self.inner.hdel(key, field).await
    }

    async fn hlen(&self, key: &str) -> Result<usize, AppError> {
        self.inner.hlen(key).await
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), AppError> {
        self.inner.zadd(key, score, member).await
    }

    async fn zrange(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.inner.zrange(key).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.inner.sadd(key, member).await
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.inner.srem(key, member).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.inner.smembers(key).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        self.inner.keys_with_prefix(prefix).await
    }

    async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, AppError> {
        self.inner.set_nx_px(key, value, ttl).await
    }

    async fn del_if_eq(&self, key: &str, value: &str) -> Result<bool, AppError> {
        self.inner.del_if_eq(key, value).await
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), AppError> {
        self.inner.publish(channel, payload).await
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, AppError> {
        self.inner.subscribe(channel).await
    }
}
