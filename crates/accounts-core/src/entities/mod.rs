//! Domain entities - core business objects

mod audit;
mod user;

pub use audit::{AuditField, AuditTrail, Audited, DELETER_COMMENT_MAX, PURGE_COMMENT};
pub use user::{User, UserField, NAME_MAX, PASSWORD_HASH_MAX, ROLE_ADMIN, ROLE_USER, USERNAME_MAX};
