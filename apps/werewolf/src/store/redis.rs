use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError, RedisResult, Script};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{Store, Subscription};
use crate::error::AppError;
use crate::errors::ErrorCode;

// Command retry configuration
const MAX_ATTEMPTS: u32 = 3;
const INITIAL_RETRY_DELAY_MS: u64 = 50;
const MAX_RETRY_DELAY_MS: u64 = 200;

const SCAN_BATCH: usize = 200;

static RELEASE_IF_EQ: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end"#,
    )
});

/// [`Store`] backed by a Redis server.
///
/// Commands share one multiplexed [`ConnectionManager`]; each subscription
/// opens its own pub/sub connection.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let client = Client::open(redis_url)
            .map_err(|err| AppError::config(format!("Invalid REDIS_URL: {err}")))?;

        let manager = ConnectionManager::new(client.clone()).await.map_err(|err| {
            AppError::store(
                ErrorCode::StoreUnavailable,
                "Unable to initialize Redis connection manager",
                err,
            )
        })?;

        info!(redis_url, "Connected to Redis");
        Ok(Self { client, manager })
    }

    /// Run one command, retrying transient failures with capped exponential
    /// backoff.
    async fn run<T, F, Fut>(&self, op: &'static str, key: &str, command: F) -> Result<T, AppError>
    where
        F: Fn(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            match command(self.manager.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let transient = is_transient_error(&err);
                    if attempt >= MAX_ATTEMPTS || !transient {
                        let code = if transient {
                            ErrorCode::StoreUnavailable
                        } else {
                            ErrorCode::StoreError
                        };
                        return Err(AppError::store(
                            code,
                            format!("Redis {op} failed for '{key}'"),
                            err,
                        ));
                    }

                    let delay_ms = INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(MAX_RETRY_DELAY_MS);
                    warn!(
                        error = %err,
                        op,
                        key,
                        attempt,
                        retry_delay_ms = delay_ms,
                        "Redis command failed, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

fn is_transient_error(err: &RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout()
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.run("GET", key, |mut conn| async move { conn.get(key).await })
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.run("SET", key, |mut conn| async move {
            conn.set::<_, _, ()>(key, value).await
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<bool, AppError> {
        let removed: usize = self
            .run("DEL", key, |mut conn| async move { conn.del(key).await })
            .await?;
        Ok(removed > 0)
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        self.run("HGET", key, |mut conn| async move { conn.hget(key, field).await })
            .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), AppError> {
        self.run("HSET", key, |mut conn| async move {
            conn.hset::<_, _, _, ()>(key, field, value).await
        })
        .await
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, AppError> {
        self.run("HGETALL", key, |mut conn| async move { conn.hgetall(key).await })
            .await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool, AppError> {
        let removed: usize = self
            .run("HDEL", key, |mut conn| async move { conn.hdel(key, field).await })
            .await?;
        Ok(removed > 0)
    }

    async fn hlen(&self, key: &str) -> Result<usize, AppError> {
        self.run("HLEN", key, |mut conn| async move { conn.hlen(key).await })
            .await
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), AppError> {
        self.run("ZADD", key, |mut conn| async move {
            conn.zadd::<_, _, _, ()>(key, member, score).await
        })
        .await
    }

    async fn zrange(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.run("ZRANGE", key, |mut conn| async move {
            conn.zrange(key, 0, -1).await
        })
        .await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.run("SADD", key, |mut conn| async move {
            conn.sadd::<_, _, ()>(key, member).await
        })
        .await
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.run("SREM", key, |mut conn| async move {
            conn.srem::<_, _, ()>(key, member).await
        })
        .await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.run("SMEMBERS", key, |mut conn| async move {
            conn.smembers(key).await
        })
        .await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let pattern = format!("{prefix}*");
        let mut found = Vec::new();
        let mut cursor = 0u64;
        loop {
            let pattern = pattern.as_str();
            let (next, batch): (u64, Vec<String>) = self
                .run("SCAN", prefix, |mut conn| async move {
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn)
                        .await
                })
                .await?;
            found.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        found.sort();
        found.dedup();
        Ok(found)
    }

    async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, AppError> {
        let ttl_ms = ttl.as_millis().max(1) as u64;
        let reply: Option<String> = self
            .run("SET NX", key, |mut conn| async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("PX")
                    .arg(ttl_ms)
                    .query_async(&mut conn)
                    .await
            })
            .await?;
        Ok(reply.is_some())
    }

    async fn del_if_eq(&self, key: &str, value: &str) -> Result<bool, AppError> {
        let removed: i64 = self
            .run("EVALSHA", key, |mut conn| async move {
                RELEASE_IF_EQ.key(key).arg(value).invoke_async(&mut conn).await
            })
            .await?;
        Ok(removed > 0)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), AppError> {
        self.run("PUBLISH", channel, |mut conn| async move {
            conn.publish::<_, _, ()>(channel, payload).await
        })
        .await
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, AppError> {
        let mut pubsub = self.client.get_async_pubsub().await.map_err(|err| {
            AppError::store(
                ErrorCode::SubscriptionFailed,
                "Failed to open Redis pubsub connection",
                err,
            )
        })?;

        pubsub.subscribe(channel).await.map_err(|err| {
            AppError::store(
                ErrorCode::SubscriptionFailed,
                format!("Failed to subscribe to Redis channel {channel}"),
                err,
            )
        })?;
        debug!(channel, "Redis subscription established");

        let owned = channel.to_string();
        let payloads = pubsub.into_on_message().filter_map(move |msg| {
            let payload = match msg.get_payload::<String>() {
                Ok(payload) => Some(payload),
                Err(err) => {
                    warn!(error = %err, channel = %owned, "Dropping non-text Redis payload");
                    None
                }
            };
            futures::future::ready(payload)
        });

        Ok(Subscription::new(channel, payloads))
    }
}
