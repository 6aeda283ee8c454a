use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use super::{Store, Subscription};
use crate::error::AppError;
use crate::errors::ErrorCode;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(BTreeSet<String>),
    /// Kept sorted by (score, member).
    ZSet(Vec<(i64, String)>),
}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process [`Store`] with Redis-like semantics.
///
/// Clones share the same data, so one instance can back every component of
/// a single-process game. Expiry follows tokio's clock, which lets paused-time
/// tests drive lock TTLs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, Entry>>>,
    channels: Arc<DashMap<String, broadcast::Sender<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Run `f` against the live entry at `key`, dropping it first if expired.
    fn with_entry<T>(&self, key: &str, f: impl FnOnce(Option<&mut Entry>) -> T) -> T {
        let mut data = self.data.lock();
        let now = Instant::now();
        if data.get(key).is_some_and(|e| e.is_expired(now)) {
            data.remove(key);
        }
        f(data.get_mut(key))
    }

    /// Fetch or create the entry at `key`, requiring it to hold the kind
    /// `make` produces.
    fn with_value_mut<T>(
        &self,
        key: &str,
        make: fn() -> Value,
        f: impl FnOnce(&mut Value) -> T,
    ) -> Result<T, AppError> {
        let mut data = self.data.lock();
        let now = Instant::now();
        if data.get(key).is_some_and(|e| e.is_expired(now)) {
            data.remove(key);
        }
        let entry = data
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(make()));
        if std::mem::discriminant(&entry.value) != std::mem::discriminant(&make()) {
            return Err(wrong_type(key));
        }
        Ok(f(&mut entry.value))
    }
}

fn wrong_type(key: &str) -> AppError {
    AppError::store(
        ErrorCode::StoreError,
        format!("WRONGTYPE operation against key '{key}'"),
        std::io::Error::new(std::io::ErrorKind::InvalidData, "wrong value kind"),
    )
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.with_entry(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.data
            .lock()
            .insert(key.to_string(), Entry::new(Value::Str(value.to_string())));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, AppError> {
        let now = Instant::now();
        Ok(self
            .data
            .lock()
            .remove(key)
            .is_some_and(|e| !e.is_expired(now)))
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        self.with_entry(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(None),
            Some(Value::Hash(h)) => Ok(h.get(field).cloned()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), AppError> {
        self.with_value_mut(key, || Value::Hash(HashMap::new()), |v| {
            if let Value::Hash(h) = v {
                h.insert(field.to_string(), value.to_string());
            }
        })
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, AppError> {
        self.with_entry(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(h)) => Ok(h.clone()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool, AppError> {
        let mut data = self.data.lock();
        let Some(entry) = data.get_mut(key) else {
            return Ok(false);
        };
        let Value::Hash(h) = &mut entry.value else {
            return Err(wrong_type(key));
        };
        let removed = h.remove(field).is_some();
        if h.is_empty() {
            data.remove(key);
        }
        Ok(removed)
    }

    async fn hlen(&self, key: &str) -> Result<usize, AppError> {
        self.with_entry(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(0),
            Some(Value::Hash(h)) => Ok(h.len()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), AppError> {
        self.with_value_mut(key, || Value::ZSet(Vec::new()), |v| {
            if let Value::ZSet(z) = v {
                z.retain(|(_, m)| m != member);
                let item = (score, member.to_string());
                let idx = z.partition_point(|existing| existing < &item);
                z.insert(idx, item);
            }
        })
    }

    async fn zrange(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.with_entry(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(Value::ZSet(z)) => Ok(z.iter().map(|(_, m)| m.clone()).collect()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.with_value_mut(key, || Value::Set(BTreeSet::new()), |v| {
            if let Value::Set(s) = v {
                s.insert(member.to_string());
            }
        })
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut data = self.data.lock();
        let Some(entry) = data.get_mut(key) else {
            return Ok(());
        };
        let Value::Set(s) = &mut entry.value else {
            return Err(wrong_type(key));
        };
        s.remove(member);
        if s.is_empty() {
            data.remove(key);
        }
        Ok(())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.with_entry(key, |entry| match entry.map(|e| &e.value) {
            None => Ok(Vec::new()),
            Some(Value::Set(s)) => Ok(s.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        let now = Instant::now();
        Ok(self
            .data
            .lock()
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && !e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, AppError> {
        let mut data = self.data.lock();
        let now = Instant::now();
        if data.get(key).is_some_and(|e| !e.is_expired(now)) {
            return Ok(false);
        }
        data.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(now + ttl),
            },
        );
        Ok(true)
    }

    async fn del_if_eq(&self, key: &str, value: &str) -> Result<bool, AppError> {
        let mut data = self.data.lock();
        let now = Instant::now();
        let matches = data.get(key).is_some_and(|e| {
            !e.is_expired(now) && matches!(&e.value, Value::Str(s) if s == value)
        });
        if matches {
            data.remove(key);
        }
        Ok(matches)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), AppError> {
        if let Some(tx) = self.channels.get(channel) {
            // No receivers is not an error, same as PUBLISH to an empty channel.
            let _ = tx.send(payload.to_string());
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, AppError> {
        let rx = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        let owned = channel.to_string();
        let payloads = BroadcastStream::new(rx).filter_map(move |item| {
            let payload = match item {
                Ok(payload) => Some(payload),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(channel = %owned, skipped, "Subscriber lagged, payloads dropped");
                    None
                }
            };
            futures::future::ready(payload)
        });

        Ok(Subscription::new(channel, payloads))
    }
}
