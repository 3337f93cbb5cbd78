//! # accounts-core
//!
//! Domain layer containing audited entities, value objects, field
//! serialization and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod serialization;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AuditField, AuditTrail, Audited, User, UserField, DELETER_COMMENT_MAX, PURGE_COMMENT,
    ROLE_ADMIN, ROLE_USER,
};
pub use error::DomainError;
pub use serialization::{EntityField, FieldSerialize};
pub use traits::{RepoResult, SoftDeleteTable, UserPredicate, UserRepository};
pub use value_objects::{
    is_uuid, short_uuid, Criteria, CriteriaValue, EntityId, EntityIdParseError, IncludeDeleted,
    OrderBy, SortOrder, ZoneConverter,
};
