//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use accounts_core::EntityId;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Debug, Deserialize)]
struct UserIdParams {
    id: String,
}

/// `:id` path segment parsed as a user id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdPath(pub EntityId);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<UserIdParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        EntityId::parse(&params.id)
            .map(Self)
            .map_err(|_| ApiError::invalid_path("Invalid user id format"))
    }
}
