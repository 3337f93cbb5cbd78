//! Session storage module.
//!
//! Provides the session payload and its stores:
//! - Redis-backed (shared between server instances)
//! - In-memory (single process, used when Redis is not configured)

mod data;
mod redis_store;
mod store;

pub use data::{Flash, FlashKind, SessionData, SessionUser};
pub use redis_store::RedisSessionStore;
pub use store::{generate_session_id, MemorySessionStore, SessionError, SessionResult, SessionStore};
