//! # accounts-cache
//!
//! Session storage for the web flow.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Session Data**: Authenticated user snapshot, CSRF tokens, flashes
//! - **Stores**: Redis-backed and in-memory [`SessionStore`] implementations
//!
//! ## Example
//!
//! ```ignore
//! use accounts_cache::{RedisPool, RedisPoolConfig, RedisSessionStore, SessionData, SessionStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let store = RedisSessionStore::with_ttl(pool, 3600);
//!
//! let mut session = SessionData::new();
//! session.last_username = Some("jdoe".to_string());
//! let id = store.rotate(None, &session).await?;
//! ```

pub mod pool;
pub mod session;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export session types
pub use session::{
    generate_session_id, Flash, FlashKind, MemorySessionStore, RedisSessionStore, SessionData,
    SessionError, SessionResult, SessionStore, SessionUser,
};
