//! Pooled Redis connections for session payloads.
//!
//! The pool deals in raw strings under a key namespace; encoding belongs to
//! the callers. Reads refresh the expiry with `GETEX` so that an active
//! visitor keeps their session.

use std::time::Duration;

use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    pub max_connections: usize,
    /// Prefix put in front of every key
    pub namespace: String,
    /// How long a request waits for a free connection
    pub wait_timeout: Option<Duration>,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 10,
            namespace: "session:".to_string(),
            wait_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl From<&accounts_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &accounts_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
            ..Self::default()
        }
    }
}

/// Error type for Redis pool operations
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Namespaced Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
    namespace: String,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("namespace", &self.namespace)
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Build the pool. No connection is opened until first use.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .wait_timeout(config.wait_timeout)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        tracing::info!(
            url = %redact(&config.url),
            namespace = %config.namespace,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self {
            pool,
            namespace: config.namespace,
        })
    }

    pub fn from_config(config: &accounts_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Full Redis key for a name in this pool's namespace
    #[must_use]
    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.namespace)
    }

    async fn connection(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Read a value and push its expiry `ttl` into the future
    pub async fn get_and_touch(&self, name: &str, ttl: Duration) -> RedisResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value = redis::cmd("GETEX")
            .arg(self.key(name))
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async::<Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    /// Store a value expiring after `ttl`
    pub async fn put(&self, name: &str, value: &str, ttl: Duration) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(self.key(name), value, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    /// Delete a value; `true` if it existed
    pub async fn remove(&self, name: &str) -> RedisResult<bool> {
        let mut conn = self.connection().await?;
        let deleted: i64 = conn.del(self.key(name)).await?;
        Ok(deleted > 0)
    }
}

/// URL without credentials, for logs
fn redact(url: &str) -> &str {
    url.split('@').next_back().unwrap_or(url)
}
