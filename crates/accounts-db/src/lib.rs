//! # accounts-db
//!
//! Persistence layer implementing [`accounts_core::UserRepository`].
//!
//! ## Overview
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - A soft-delete aware query builder
//! - PostgreSQL and in-memory repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use accounts_db::{create_pool, run_migrations, DatabaseConfig, PgUserRepository};
//! use accounts_core::{IncludeDeleted, OrderBy, UserRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     let users = PgUserRepository::new(pool);
//!     let active = users.find_all(&OrderBy::new().asc("username"), IncludeDeleted::No).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{MemoryUserRepository, PgUserRepository, SoftDeleteQuery};
