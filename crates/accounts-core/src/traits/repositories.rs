//! Repository traits (ports) - define the interface for data access
//!
//! Every read takes an [`IncludeDeleted`] filter. Implementations apply the
//! deletion predicate before any other filtering, and single-row lookups
//! return `Ok(None)` when nothing survives it.

use async_trait::async_trait;

use crate::entities::User;
use crate::error::DomainError;
use crate::value_objects::{Criteria, EntityId, IncludeDeleted, OrderBy};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// In-memory predicate for [`UserRepository::matching`]
pub type UserPredicate<'a> = &'a (dyn Fn(&User) -> bool + Send + Sync);

// ============================================================================
// Table configuration
// ============================================================================

/// Storage configuration of a soft-deletable entity.
///
/// Every constant without a default must be provided by the implementor.
pub trait SoftDeleteTable {
    /// Table name
    const TABLE: &'static str;

    /// Alias used in generated queries
    const ALIAS: &'static str;

    /// Deletion timestamp column
    const DELETED_COLUMN: &'static str = "deleted_at";

    /// Columns accepted in criteria and ordering
    const QUERYABLE: &'static [&'static str];

    /// Qualified deletion column, e.g. `u.deleted_at`
    fn deleted_column() -> String {
        format!("{}.{}", Self::ALIAS, Self::DELETED_COLUMN)
    }
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: EntityId, include: IncludeDeleted) -> RepoResult<Option<User>>;

    /// All users in the given order
    async fn find_all(&self, order_by: &OrderBy, include: IncludeDeleted) -> RepoResult<Vec<User>>;

    /// Users matching every criterion
    async fn find_by(
        &self,
        criteria: &Criteria,
        order_by: &OrderBy,
        limit: Option<i64>,
        offset: Option<i64>,
        include: IncludeDeleted,
    ) -> RepoResult<Vec<User>>;

    /// Single user matching every criterion.
    ///
    /// More than one match is [`DomainError::NonUniqueResult`].
    async fn find_one_by(
        &self,
        criteria: &Criteria,
        order_by: &OrderBy,
        include: IncludeDeleted,
    ) -> RepoResult<Option<User>> {
        let mut rows = self.find_by(criteria, order_by, Some(2), None, include).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => Err(DomainError::NonUniqueResult),
        }
    }

    /// Users passing an in-memory predicate, after the deletion filter
    async fn matching(
        &self,
        predicate: UserPredicate<'_>,
        include: IncludeDeleted,
    ) -> RepoResult<Vec<User>> {
        let rows = self.find_all(&OrderBy::default(), include).await?;
        Ok(rows
            .into_iter()
            .filter(|u| include.admits(u.audit.is_deleted()) && predicate(u))
            .collect())
    }

    /// Active user whose username or email equals `identifier`
    async fn load_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>>;

    /// Check if a username is taken by any user other than `except`
    async fn username_exists(&self, username: &str, except: Option<EntityId>) -> RepoResult<bool>;

    /// Check if an email is taken by any user other than `except`
    async fn email_exists(&self, email: &str, except: Option<EntityId>) -> RepoResult<bool>;

    /// Insert a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Persist every field, stamping the modification time
    async fn update(&self, user: &mut User) -> RepoResult<()>;

    /// Hard delete, stamping deletion metadata first
    async fn purge(&self, user: &mut User) -> RepoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Minimal repository exercising the provided methods
    struct FixedRepo(Mutex<Vec<User>>);

    #[async_trait]
    impl UserRepository for FixedRepo {
        async fn find_by_id(&self, id: EntityId, include: IncludeDeleted) -> RepoResult<Option<User>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.audit.id == id && include.admits(u.audit.is_deleted()))
                .cloned())
        }

        async fn find_all(&self, _order_by: &OrderBy, include: IncludeDeleted) -> RepoResult<Vec<User>> {
            Ok(self
                .0
                .lock()
                .unwrap()
                .iter()
                .filter(|u| include.admits(u.audit.is_deleted()))
                .cloned()
                .collect())
        }

        async fn find_by(
            &self,
            _criteria: &Criteria,
            order_by: &OrderBy,
            limit: Option<i64>,
            _offset: Option<i64>,
            include: IncludeDeleted,
        ) -> RepoResult<Vec<User>> {
            let mut rows = self.find_all(order_by, include).await?;
            if let Some(limit) = limit {
                rows.truncate(limit as usize);
            }
            Ok(rows)
        }

        async fn load_by_identifier(&self, _identifier: &str) -> RepoResult<Option<User>> {
            Ok(None)
        }

        async fn username_exists(&self, _username: &str, _except: Option<EntityId>) -> RepoResult<bool> {
            Ok(false)
        }

        async fn email_exists(&self, _email: &str, _except: Option<EntityId>) -> RepoResult<bool> {
            Ok(false)
        }

        async fn create(&self, user: &User) -> RepoResult<()> {
            self.0.lock().unwrap().push(user.clone());
            Ok(())
        }

        async fn update(&self, _user: &mut User) -> RepoResult<()> {
            Ok(())
        }

        async fn purge(&self, _user: &mut User) -> RepoResult<()> {
            Ok(())
        }
    }

    fn repo_with(users: Vec<User>) -> FixedRepo {
        FixedRepo(Mutex::new(users))
    }

    #[tokio::test]
    async fn test_find_one_by_non_unique() {
        let repo = repo_with(vec![User::new("a", None), User::new("b", None)]);
        let result = repo
            .find_one_by(&Criteria::new(), &OrderBy::new(), IncludeDeleted::No)
            .await;
        assert!(matches!(result, Err(DomainError::NonUniqueResult)));
    }

    #[tokio::test]
    async fn test_find_one_by_none_when_filtered_out() {
        let mut deleted = User::new("gone", None);
        deleted.audit.delete(None, None).unwrap();
        let repo = repo_with(vec![deleted]);

        let result = repo
            .find_one_by(&Criteria::new(), &OrderBy::new(), IncludeDeleted::No)
            .await
            .unwrap();
        assert!(result.is_none());

        let result = repo
            .find_one_by(&Criteria::new(), &OrderBy::new(), IncludeDeleted::Exclusive)
            .await
            .unwrap();
        assert_eq!(result.map(|u| u.username), Some("gone".to_string()));
    }

    #[tokio::test]
    async fn test_matching_applies_deletion_filter() {
        let mut deleted = User::new("alice-old", None);
        deleted.audit.delete(None, None).unwrap();
        let repo = repo_with(vec![User::new("alice", None), deleted, User::new("bob", None)]);

        let starts_with_a = |u: &User| u.username.starts_with('a');

        let active = repo.matching(&starts_with_a, IncludeDeleted::No).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].username, "alice");

        let only_deleted = repo.matching(&starts_with_a, IncludeDeleted::Exclusive).await.unwrap();
        assert!(only_deleted.iter().all(|u| u.audit.deleted_at.is_some()));
        assert_eq!(only_deleted.len(), 1);

        let all = repo.matching(&starts_with_a, IncludeDeleted::Yes).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    struct Users;

    impl SoftDeleteTable for Users {
        const TABLE: &'static str = "users";
        const ALIAS: &'static str = "u";
        const QUERYABLE: &'static [&'static str] = &["username"];
    }

    #[test]
    fn test_deleted_column() {
        assert_eq!(Users::deleted_column(), "u.deleted_at");
    }
}
