//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use accounts_core::{
    Criteria, EntityId, IncludeDeleted, OrderBy, RepoResult, User, UserRepository,
};

use crate::mappers::UserRow;
use crate::models::{UserModel, USER_COLUMNS};

use super::error::{map_db_error, map_unique_violation, user_not_found};
use super::soft_delete::SoftDeleteQuery;

type UserQuery = SoftDeleteQuery<UserModel>;

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rows become entities with their access time stamped
    fn hydrate(rows: Vec<UserModel>) -> Vec<User> {
        rows.into_iter().map(Self::hydrate_one).collect()
    }

    fn hydrate_one(row: UserModel) -> User {
        let mut user = User::from(row);
        user.audit.touch_accessed();
        user
    }

    async fn exists(&self, column: &str, value: &str, except: Option<EntityId>) -> RepoResult<bool> {
        // Deleted rows still hold their unique keys
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {column} = $1 AND ($2::UUID IS NULL OR id <> $2))"
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .bind(except.map(EntityId::into_inner))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: EntityId, include: IncludeDeleted) -> RepoResult<Option<User>> {
        let row = UserQuery::select(USER_COLUMNS, include)
            .criteria(&Criteria::new().eq("id", id))?
            .fetch_optional::<UserModel>(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Self::hydrate_one))
    }

    #[instrument(skip(self))]
    async fn find_all(&self, order_by: &OrderBy, include: IncludeDeleted) -> RepoResult<Vec<User>> {
        let rows = UserQuery::select(USER_COLUMNS, include)
            .order_by(order_by)?
            .fetch_all::<UserModel>(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Self::hydrate(rows))
    }

    #[instrument(skip(self))]
    async fn find_by(
        &self,
        criteria: &Criteria,
        order_by: &OrderBy,
        limit: Option<i64>,
        offset: Option<i64>,
        include: IncludeDeleted,
    ) -> RepoResult<Vec<User>> {
        let rows = UserQuery::select(USER_COLUMNS, include)
            .criteria(criteria)?
            .order_by(order_by)?
            .limit(limit)
            .offset(offset)
            .fetch_all::<UserModel>(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Self::hydrate(rows))
    }

    #[instrument(skip(self))]
    async fn load_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>> {
        // Usernames and emails are unique, but one user's username may equal
        // another's email; the oldest account wins.
        let row = UserQuery::select(USER_COLUMNS, IncludeDeleted::No)
            .any_eq(&["username", "email"], identifier)?
            .order_by(&OrderBy::new().asc("created_at"))?
            .limit(Some(1))
            .fetch_optional::<UserModel>(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.map(Self::hydrate_one))
    }

    #[instrument(skip(self))]
    async fn username_exists(&self, username: &str, except: Option<EntityId>) -> RepoResult<bool> {
        self.exists("username", username, except).await
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str, except: Option<EntityId>) -> RepoResult<bool> {
        self.exists("email", email, except).await
    }

    #[instrument(skip(self, user), fields(user_id = %user.audit.id))]
    async fn create(&self, user: &User) -> RepoResult<()> {
        let row = UserRow::new(user);
        sqlx::query(
            r"
            INSERT INTO users (id, username, password_hash, first_name, last_name, display_name,
                               email, roles, last_seen_at, created_at, modified_at, accessed_at,
                               deleted_at, creator_id, owner_id, deleter_id, deleter_comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ",
        )
        .bind(row.id)
        .bind(row.username)
        .bind(row.password_hash)
        .bind(row.first_name)
        .bind(row.last_name)
        .bind(row.display_name)
        .bind(row.email)
        .bind(row.roles)
        .bind(row.last_seen_at)
        .bind(row.created_at)
        .bind(row.modified_at)
        .bind(row.accessed_at)
        .bind(row.deleted_at)
        .bind(row.creator_id)
        .bind(row.owner_id)
        .bind(row.deleter_id)
        .bind(row.deleter_comment)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.audit.id))]
    async fn update(&self, user: &mut User) -> RepoResult<()> {
        user.audit.touch_modified();
        let row = UserRow::new(user);
        let result = sqlx::query(
            r"
            UPDATE users
            SET username = $2, password_hash = $3, first_name = $4, last_name = $5,
                display_name = $6, email = $7, roles = $8, last_seen_at = $9,
                modified_at = $10, accessed_at = $11, deleted_at = $12, owner_id = $13,
                deleter_id = $14, deleter_comment = $15
            WHERE id = $1
            ",
        )
        .bind(row.id)
        .bind(row.username)
        .bind(row.password_hash)
        .bind(row.first_name)
        .bind(row.last_name)
        .bind(row.display_name)
        .bind(row.email)
        .bind(row.roles)
        .bind(row.last_seen_at)
        .bind(row.modified_at)
        .bind(row.accessed_at)
        .bind(row.deleted_at)
        .bind(row.owner_id)
        .bind(row.deleter_id)
        .bind(row.deleter_comment)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user.audit.id));
        }

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.audit.id))]
    async fn purge(&self, user: &mut User) -> RepoResult<()> {
        user.audit.prepare_purge();
        info!(
            deleted_at = ?user.audit.deleted_at,
            comment = user.audit.deleter_comment.as_deref().unwrap_or_default(),
            "Purging user"
        );

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.audit.id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user.audit.id));
        }

        Ok(())
    }
}
