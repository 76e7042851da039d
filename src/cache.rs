//! On-disk response cache.
//!
//! Completions live in a fjall keyspace as postcard-encoded entries carrying
//! their own expiry. Stale entries are dropped when read.

use std::fmt::{Debug, Display};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fjall::{Database, Keyspace};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tokio::task;

use crate::Result;
use crate::error::PromptCraftError;
use crate::llm::ChatMessage;

#[derive(Serialize, Deserialize)]
struct CachedCompletion<T> {
    value: T,
    /// Unix seconds
    expires_at: u64,
}

/// On-disk cache of model responses, keyed by prompt content.
#[derive(Clone)]
pub struct ResponseCache {
    _db: Database,
    responses: Keyspace,
    ttl: Duration,
}

fn cache_err(context: &str, e: impl Display) -> PromptCraftError {
    PromptCraftError::cache(format!("{context}: {e}"))
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| cache_err("system clock before epoch", e))
}

/// Builds the cache key for a completion request.
///
/// Model, temperature, every message and the stop sequences all take part, so
/// the same prompt sent to a different model never shares an entry.
#[must_use]
pub fn prompt_key(model: &str, temperature: f32, messages: &[ChatMessage], stop: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    hasher.update([0]);
    hasher.update(temperature.to_le_bytes());
    for message in messages {
        hasher.update(message.role.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(message.content.as_bytes());
        hasher.update([0]);
    }
    for s in stop {
        hasher.update(s.as_bytes());
        hasher.update([1]);
    }
    format!("llm:{}", hex::encode(hasher.finalize()))
}

impl ResponseCache {
    /// Opens (or creates) the cache database under `path`.
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::builder(path)
            .open()
            .map_err(|e| cache_err(&format!("cannot open {}", path.display()), e))?;
        let responses = db
            .keyspace("responses", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| cache_err("cannot open responses keyspace", e))?;
        Ok(ResponseCache {
            _db: db,
            responses,
            ttl,
        })
    }

    /// Stores a completion for the cache's time-to-live.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(&self, key: &str, value: T) -> Result<()> {
        let expires_at = unix_now()?.saturating_add(self.ttl.as_secs());
        let bytes = postcard::to_stdvec(&CachedCompletion { value, expires_at })
            .map_err(|e| cache_err("cannot encode entry", e))?;

        let responses = self.responses.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || responses.insert(key, bytes))
            .await
            .map_err(|e| cache_err("write task failed", e))?
            .map_err(|e| cache_err("write failed", e))?;
        Ok(())
    }

    /// Returns the stored completion, or `None` when missing or expired.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let responses = self.responses.clone();
        let key_bytes = key.as_bytes().to_vec();
        let stored = task::spawn_blocking(move || {
            responses.get(key_bytes).map(|v| v.map(|bytes| bytes.to_vec()))
        })
        .await
        .map_err(|e| cache_err("read task failed", e))?
        .map_err(|e| cache_err("read failed", e))?;

        let Some(bytes) = stored else {
            tracing::debug!("Cache miss");
            return Ok(None);
        };

        let entry: CachedCompletion<T> =
            postcard::from_bytes(&bytes).map_err(|e| cache_err("cannot decode entry", e))?;

        if unix_now()? < entry.expires_at {
            tracing::debug!("Cache hit");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Cache entry expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let responses = self.responses.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || responses.remove(key))
            .await
            .map_err(|e| cache_err("remove task failed", e))?
            .map_err(|e| cache_err("remove failed", e))?;
        Ok(())
    }
}
