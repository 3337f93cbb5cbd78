//! Repository implementations
//!
//! PostgreSQL and in-memory implementations of the repository traits
//! defined in accounts-core. Both apply the soft-delete filter the same way.

mod error;
mod memory;
mod soft_delete;
mod user;

pub use error::{EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
pub use memory::MemoryUserRepository;
pub use soft_delete::SoftDeleteQuery;
pub use user::PgUserRepository;
