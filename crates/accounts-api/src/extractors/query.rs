//! Admin list query extractor
//!
//! `?include_deleted=no|yes|exclusive&sort=<field>&order=asc|desc`

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use accounts_core::{IncludeDeleted, OrderBy};
use serde::Deserialize;

use crate::response::ApiError;

/// Fields the user list may be sorted by
pub const SORTABLE: &[&str] = &["username", "email", "created_at", "last_seen_at", "deleted_at"];

/// Raw list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub include_deleted: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

/// Validated list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub include: IncludeDeleted,
    pub order_by: OrderBy,
}

impl TryFrom<ListParams> for ListQuery {
    type Error = ApiError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let include = match params.include_deleted.as_deref() {
            None | Some("") => IncludeDeleted::No,
            Some(raw) => raw
                .parse()
                .map_err(|e: accounts_core::DomainError| ApiError::invalid_query(e.to_string()))?,
        };

        let field = params.sort.as_deref().unwrap_or("username");
        let order = params.order.as_deref().unwrap_or("asc");
        let order_by = OrderBy::from_pairs([(field, order)])
            .and_then(|o| o.validate(SORTABLE).map(|()| o))
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Ok(Self { include, order_by })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<ListParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;
        Self::try_from(params)
    }
}
