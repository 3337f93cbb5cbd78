//! Session store abstraction and the in-process implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use accounts_common::CsrfTokenManager;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::data::SessionData;
use crate::pool::RedisPoolError;

/// Session store errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Redis(#[from] RedisPoolError),

    #[error("Session encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Fresh random session id
pub fn generate_session_id() -> String {
    CsrfTokenManager::new().generate()
}

/// Persistent session storage keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Data for a live session, `None` if unknown or expired
    async fn load(&self, id: &str) -> SessionResult<Option<SessionData>>;

    /// Store data, resetting the expiry
    async fn save(&self, id: &str, data: &SessionData) -> SessionResult<()>;

    async fn destroy(&self, id: &str) -> SessionResult<()>;

    /// Move data to a new id, returning it
    async fn rotate(&self, old_id: Option<&str>, data: &SessionData) -> SessionResult<String> {
        if let Some(old_id) = old_id {
            self.destroy(old_id).await?;
        }
        let id = generate_session_id();
        self.save(&id, data).await?;
        Ok(id)
    }
}

/// Writes between two sweeps of expired sessions
const DEFAULT_SWEEP_INTERVAL: usize = 256;

/// Sessions kept in process memory.
///
/// Expired entries are dropped when loaded and swept every
/// `sweep_interval` saves.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, (SessionData, Instant)>>,
    ttl: Duration,
    writes: AtomicUsize,
    sweep_interval: usize,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            writes: AtomicUsize::new(0),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_sweep_interval(mut self, writes: usize) -> Self {
        self.sweep_interval = writes.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop expired sessions
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, (_, expires)| *expires > now);
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> SessionResult<Option<SessionData>> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read();
            match sessions.get(id) {
                Some((data, expires)) if *expires > now => return Ok(Some(data.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        self.sessions.write().remove(id);
        Ok(None)
    }

    async fn save(&self, id: &str, data: &SessionData) -> SessionResult<()> {
        let now = Instant::now();
        let sweep = (self.writes.fetch_add(1, Ordering::Relaxed) + 1) % self.sweep_interval == 0;

        let mut sessions = self.sessions.write();
        if sweep {
            let before = sessions.len();
            sessions.retain(|_, (_, expires)| *expires > now);
            let dropped = before - sessions.len();
            if dropped > 0 {
                debug!(dropped, remaining = sessions.len(), "Expired sessions swept");
            }
        }
        sessions.insert(id.to_string(), (data.clone(), now + self.ttl));
        Ok(())
    }

    async fn destroy(&self, id: &str) -> SessionResult<()> {
        self.sessions.write().remove(id);
        Ok(())
    }
}
