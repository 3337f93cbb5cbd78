//! Session storage in Redis.
//!
//! Each session is a JSON value under `session:<id>`. Loading a session
//! slides its expiry forward.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use super::data::SessionData;
use super::store::{SessionResult, SessionStore};
use crate::pool::RedisPool;

/// Default TTL for sessions (14 days)
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Redis-backed session store
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
    ttl: Duration,
}

impl RedisSessionStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            pool,
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Underlying pool, for health checks
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }
}

/// Stored payload, `None` when it no longer decodes
fn decode(raw: &str) -> Option<SessionData> {
    match serde_json::from_str(raw) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(error = %e, "Discarding undecodable session");
            None
        }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> SessionResult<Option<SessionData>> {
        let Some(raw) = self.pool.get_and_touch(id, self.ttl).await? else {
            return Ok(None);
        };
        let data = decode(&raw);
        if data.is_none() {
            self.pool.remove(id).await?;
        }
        Ok(data)
    }

    async fn save(&self, id: &str, data: &SessionData) -> SessionResult<()> {
        let raw = serde_json::to_string(data)?;
        self.pool.put(id, &raw, self.ttl).await?;
        trace!(ttl = self.ttl.as_secs(), "Stored session");
        Ok(())
    }

    async fn destroy(&self, id: &str) -> SessionResult<()> {
        if self.pool.remove(id).await? {
            debug!("Destroyed session");
        }
        Ok(())
    }
}
