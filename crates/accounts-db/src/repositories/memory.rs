//! In-memory implementation of UserRepository
//!
//! Used when no database is configured and by service tests. Criteria and
//! ordering compare the serialized field values, so the same field names are
//! accepted as by the PostgreSQL repository.

use std::cmp::Ordering;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use accounts_core::{
    Criteria, DomainError, EntityField, EntityId, FieldSerialize, IncludeDeleted, OrderBy,
    RepoResult, SoftDeleteTable, SortOrder, User, UserField, UserRepository, ZoneConverter,
};

use crate::models::UserModel;

use super::error::user_not_found;

/// Process-local user store
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing users
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn field(name: &str) -> Result<UserField, DomainError> {
        accounts_core::value_objects::validate_field(name, UserModel::QUERYABLE)?;
        UserField::from_name(name)
            .ok_or_else(|| DomainError::InvalidQuery(format!("Field \"{name}\" invalid.")))
    }

    /// Deletion filter first, then every criterion
    fn select(&self, criteria: &Criteria, include: IncludeDeleted) -> RepoResult<Vec<User>> {
        let conditions = criteria
            .iter()
            .map(|(name, value)| Ok((Self::field(name)?, value.to_json())))
            .collect::<Result<Vec<_>, DomainError>>()?;

        let zones = ZoneConverter::utc();
        Ok(self
            .users
            .read()
            .iter()
            .filter(|u| include.admits(u.audit.is_deleted()))
            .filter(|u| {
                conditions
                    .iter()
                    .all(|(field, expected)| u.field_value(*field, &zones) == *expected)
            })
            .cloned()
            .collect())
    }

    fn sort(rows: &mut [User], order_by: &OrderBy) -> RepoResult<()> {
        let keys = order_by
            .iter()
            .map(|(name, order)| Ok((Self::field(name)?, order)))
            .collect::<Result<Vec<_>, DomainError>>()?;
        if keys.is_empty() {
            return Ok(());
        }

        let zones = ZoneConverter::utc();
        rows.sort_by(|a, b| {
            keys.iter()
                .map(|(field, order)| {
                    let ordering = compare_values(&a.field_value(*field, &zones), &b.field_value(*field, &zones));
                    match order {
                        SortOrder::Asc => ordering,
                        SortOrder::Desc => ordering.reverse(),
                    }
                })
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(())
    }

    fn hydrate(mut rows: Vec<User>) -> Vec<User> {
        for user in &mut rows {
            user.audit.touch_accessed();
        }
        rows
    }
}

/// Unique key already held by another row. Callers hold the write guard.
fn conflict(users: &[User], user: &User) -> Option<DomainError> {
    let others = users.iter().filter(|u| u.audit.id != user.audit.id);
    for other in others {
        if other.username == user.username {
            return Some(DomainError::UsernameAlreadyExists);
        }
        if user.email.is_some() && other.email == user.email {
            return Some(DomainError::EmailAlreadyExists);
        }
    }
    None
}

/// Nulls sort after every value, as PostgreSQL does in ascending order
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: EntityId, include: IncludeDeleted) -> RepoResult<Option<User>> {
        let found = self
            .users
            .read()
            .iter()
            .find(|u| u.audit.id == id && include.admits(u.audit.is_deleted()))
            .cloned();
        Ok(found.map(|mut u| {
            u.audit.touch_accessed();
            u
        }))
    }

    async fn find_all(&self, order_by: &OrderBy, include: IncludeDeleted) -> RepoResult<Vec<User>> {
        self.find_by(&Criteria::new(), order_by, None, None, include).await
    }

    async fn find_by(
        &self,
        criteria: &Criteria,
        order_by: &OrderBy,
        limit: Option<i64>,
        offset: Option<i64>,
        include: IncludeDeleted,
    ) -> RepoResult<Vec<User>> {
        let mut rows = self.select(criteria, include)?;
        Self::sort(&mut rows, order_by)?;

        let offset = offset.unwrap_or(0).max(0) as usize;
        let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
        let rows = rows.into_iter().skip(offset).take(limit).collect();
        Ok(Self::hydrate(rows))
    }

    async fn load_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>> {
        let mut rows: Vec<User> = self
            .users
            .read()
            .iter()
            .filter(|u| !u.audit.is_deleted())
            .filter(|u| u.username == identifier || u.email.as_deref() == Some(identifier))
            .cloned()
            .collect();
        rows.sort_by_key(|u| u.audit.created_at);
        Ok(Self::hydrate(rows).into_iter().next())
    }

    async fn username_exists(&self, username: &str, except: Option<EntityId>) -> RepoResult<bool> {
        Ok(self
            .users
            .read()
            .iter()
            .any(|u| u.username == username && Some(u.audit.id) != except))
    }

    async fn email_exists(&self, email: &str, except: Option<EntityId>) -> RepoResult<bool> {
        Ok(self
            .users
            .read()
            .iter()
            .any(|u| u.email.as_deref() == Some(email) && Some(u.audit.id) != except))
    }

    async fn create(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.write();
        if let Some(err) = conflict(&users, user) {
            return Err(err);
        }
        if users.iter().any(|u| u.audit.id == user.audit.id) {
            return Err(DomainError::DatabaseError(format!("Duplicate id {}", user.audit.id)));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &mut User) -> RepoResult<()> {
        let mut users = self.users.write();
        if let Some(err) = conflict(&users, user) {
            return Err(err);
        }
        user.audit.touch_modified();
        let slot = users
            .iter_mut()
            .find(|u| u.audit.id == user.audit.id)
            .ok_or_else(|| user_not_found(user.audit.id))?;
        *slot = user.clone();
        Ok(())
    }

    async fn purge(&self, user: &mut User) -> RepoResult<()> {
        user.audit.prepare_purge();
        tracing::info!(
            user_id = %user.audit.id,
            deleted_at = ?user.audit.deleted_at,
            comment = user.audit.deleter_comment.as_deref().unwrap_or_default(),
            "Purging user"
        );
        let mut users = self.users.write();
        let before = users.len();
        users.retain(|u| u.audit.id != user.audit.id);
        if users.len() == before {
            return Err(user_not_found(user.audit.id));
        }
        Ok(())
    }
}
