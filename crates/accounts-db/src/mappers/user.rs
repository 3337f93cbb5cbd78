//! User entity <-> model mapper

use accounts_core::{AuditTrail, EntityId, User};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        let audit = AuditTrail {
            id: EntityId::from_uuid(model.id),
            created_at: model.created_at,
            modified_at: model.modified_at,
            accessed_at: model.accessed_at,
            deleted_at: model.deleted_at,
            creator: model.creator_id.map(EntityId::from_uuid),
            owner: model.owner_id.map(EntityId::from_uuid),
            deleter: model.deleter_id.map(EntityId::from_uuid),
            deleter_comment: model.deleter_comment,
        };

        let mut user = User::from_parts(audit, model.username, model.roles);
        user.password_hash = model.password_hash;
        user.first_name = model.first_name;
        user.last_name = model.last_name;
        user.display_name = model.display_name;
        user.email = model.email;
        user.last_seen_at = model.last_seen_at;
        user
    }
}

/// Borrowed column values of a user, in bind order
pub struct UserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub roles: Vec<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub accessed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub creator_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub deleter_id: Option<Uuid>,
    pub deleter_comment: Option<&'a str>,
}

impl<'a> UserRow<'a> {
    pub fn new(user: &'a User) -> Self {
        let audit = &user.audit;
        Self {
            id: audit.id.into_inner(),
            username: &user.username,
            password_hash: user.password_hash.as_deref(),
            first_name: user.first_name.as_deref(),
            last_name: user.last_name.as_deref(),
            display_name: user.display_name.as_deref(),
            email: user.email.as_deref(),
            roles: user.roles(),
            last_seen_at: user.last_seen_at,
            created_at: audit.created_at,
            modified_at: audit.modified_at,
            accessed_at: audit.accessed_at,
            deleted_at: audit.deleted_at,
            creator_id: audit.creator.map(EntityId::into_inner),
            owner_id: audit.owner.map(EntityId::into_inner),
            deleter_id: audit.deleter.map(EntityId::into_inner),
            deleter_comment: audit.deleter_comment.as_deref(),
        }
    }
}
