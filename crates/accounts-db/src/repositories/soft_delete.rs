//! Soft-delete aware SELECT builder
//!
//! The deletion predicate is always the first condition of the WHERE clause,
//! followed by criteria in insertion order. Field names are validated against
//! [`SoftDeleteTable::QUERYABLE`]; values are always bound, never inlined.

use std::marker::PhantomData;

use accounts_core::{Criteria, CriteriaValue, DomainError, IncludeDeleted, OrderBy, SoftDeleteTable};
use accounts_core::value_objects::validate_field;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{FromRow, Postgres, QueryBuilder};

/// SELECT over a soft-deletable table
pub struct SoftDeleteQuery<T: SoftDeleteTable> {
    builder: QueryBuilder<'static, Postgres>,
    has_where: bool,
    _table: PhantomData<fn() -> T>,
}

impl<T: SoftDeleteTable> SoftDeleteQuery<T> {
    /// `SELECT <columns> FROM <table> <alias>` with the deletion filter applied
    pub fn select(columns: &str, include: IncludeDeleted) -> Self {
        let builder = QueryBuilder::new(format!("SELECT {columns} FROM {} {}", T::TABLE, T::ALIAS));
        let mut query = Self {
            builder,
            has_where: false,
            _table: PhantomData,
        };
        if let Some(predicate) = include.predicate(&T::deleted_column()) {
            query.and();
            query.builder.push(predicate);
        }
        query
    }

    fn and(&mut self) {
        if self.has_where {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_where = true;
        }
    }

    fn column(&mut self, field: &str) {
        self.builder.push(format_args!("{}.{}", T::ALIAS, field));
    }

    /// AND every criterion
    pub fn criteria(mut self, criteria: &Criteria) -> Result<Self, DomainError> {
        criteria.validate(T::QUERYABLE)?;
        for (field, value) in criteria.iter() {
            self.and();
            self.column(field);
            match value {
                CriteriaValue::Text(text) => {
                    self.builder.push(" = ").push_bind(text.clone());
                }
                CriteriaValue::Uuid(uuid) => {
                    self.builder.push(" = ").push_bind(*uuid);
                }
                CriteriaValue::Bool(flag) => {
                    self.builder.push(" = ").push_bind(*flag);
                }
                CriteriaValue::Null => {
                    self.builder.push(" IS NULL");
                }
            }
        }
        Ok(self)
    }

    /// AND `(f1 = value OR f2 = value ...)`
    pub fn any_eq(mut self, fields: &[&str], value: &str) -> Result<Self, DomainError> {
        fields
            .iter()
            .try_for_each(|f| validate_field(f, T::QUERYABLE))?;
        if fields.is_empty() {
            return Ok(self);
        }
        self.and();
        self.builder.push("(");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.builder.push(" OR ");
            }
            self.column(field);
            self.builder.push(" = ").push_bind(value.to_string());
        }
        self.builder.push(")");
        Ok(self)
    }

    pub fn order_by(mut self, order_by: &OrderBy) -> Result<Self, DomainError> {
        order_by.validate(T::QUERYABLE)?;
        for (i, (field, order)) in order_by.iter().enumerate() {
            self.builder.push(if i == 0 { " ORDER BY " } else { ", " });
            self.column(field);
            self.builder.push(format_args!(" {}", order.as_sql()));
        }
        Ok(self)
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        if let Some(limit) = limit {
            self.builder.push(" LIMIT ").push_bind(limit);
        }
        self
    }

    pub fn offset(mut self, offset: Option<i64>) -> Self {
        if let Some(offset) = offset {
            self.builder.push(" OFFSET ").push_bind(offset);
        }
        self
    }

    /// Generated SQL, with `$n` placeholders
    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub async fn fetch_all<M>(mut self, pool: &PgPool) -> Result<Vec<M>, sqlx::Error>
    where
        M: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.builder.build_query_as::<M>().fetch_all(pool).await
    }

    pub async fn fetch_optional<M>(mut self, pool: &PgPool) -> Result<Option<M>, sqlx::Error>
    where
        M: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.builder.build_query_as::<M>().fetch_optional(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserModel;
    use accounts_core::EntityId;

    type UserQuery = SoftDeleteQuery<UserModel>;

    #[test]
    fn test_deletion_predicate_per_mode() {
        let sql = UserQuery::select("u.id", IncludeDeleted::No).sql().to_string();
        assert_eq!(sql, "SELECT u.id FROM users u WHERE u.deleted_at IS NULL");

        let sql = UserQuery::select("u.id", IncludeDeleted::Yes).sql().to_string();
        assert_eq!(sql, "SELECT u.id FROM users u");

        let sql = UserQuery::select("u.id", IncludeDeleted::Exclusive).sql().to_string();
        assert_eq!(sql, "SELECT u.id FROM users u WHERE u.deleted_at IS NOT NULL");
    }

    #[test]
    fn test_deletion_predicate_comes_first() {
        let criteria = Criteria::new()
            .eq("username", "jdoe")
            .eq("deleter_id", Option::<EntityId>::None);
        let query = UserQuery::select("u.id", IncludeDeleted::No)
            .criteria(&criteria)
            .unwrap()
            .order_by(&OrderBy::new().asc("username").desc("created_at"))
            .unwrap()
            .limit(Some(10))
            .offset(Some(20));

        assert_eq!(
            query.sql(),
            "SELECT u.id FROM users u WHERE u.deleted_at IS NULL AND u.username = $1 \
             AND u.deleter_id IS NULL ORDER BY u.username ASC, u.created_at DESC \
             LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_criteria_without_deletion_filter() {
        let query = UserQuery::select("u.id", IncludeDeleted::Yes)
            .criteria(&Criteria::new().eq("email", "a@example.com"))
            .unwrap();
        assert_eq!(query.sql(), "SELECT u.id FROM users u WHERE u.email = $1");
    }

    #[test]
    fn test_any_eq() {
        let query = UserQuery::select("u.id", IncludeDeleted::No)
            .any_eq(&["username", "email"], "jdoe")
            .unwrap()
            .limit(Some(2));
        assert_eq!(
            query.sql(),
            "SELECT u.id FROM users u WHERE u.deleted_at IS NULL \
             AND (u.username = $1 OR u.email = $2) LIMIT $3"
        );
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = UserQuery::select("u.id", IncludeDeleted::No)
            .criteria(&Criteria::new().eq("password_hash", "x"))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Invalid query: Field \"password_hash\" invalid.");

        let err = UserQuery::select("u.id", IncludeDeleted::No)
            .order_by(&OrderBy::new().asc(""))
            .err()
            .unwrap();
        assert!(err.is_programming_error());
    }
}
