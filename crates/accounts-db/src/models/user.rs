//! User database model

use accounts_core::SoftDeleteTable;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Selected columns, qualified with the table alias
pub const USER_COLUMNS: &str = "u.id, u.username, u.password_hash, u.first_name, u.last_name, \
    u.display_name, u.email, u.roles, u.last_seen_at, u.created_at, u.modified_at, \
    u.accessed_at, u.deleted_at, u.creator_id, u.owner_id, u.deleter_id, u.deleter_comment";

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: Uuid,
    pub username: String,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub creator_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub deleter_id: Option<Uuid>,
    pub deleter_comment: Option<String>,
}

impl UserModel {
    /// Check if user is soft deleted
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl SoftDeleteTable for UserModel {
    const TABLE: &'static str = "users";
    const ALIAS: &'static str = "u";
    const QUERYABLE: &'static [&'static str] = &[
        "id",
        "username",
        "first_name",
        "last_name",
        "display_name",
        "email",
        "last_seen_at",
        "created_at",
        "modified_at",
        "accessed_at",
        "deleted_at",
        "creator_id",
        "owner_id",
        "deleter_id",
        "deleter_comment",
    ];
}
