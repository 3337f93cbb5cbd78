//! Urlencoded form extractor
//!
//! Wraps [`axum::Form`] so rejections use the API error shape. Field rules
//! are checked by the services, which report them per field.

use axum::{
    async_trait,
    extract::{rejection::FormRejection, FromRequest, Request},
    Form,
};
use serde::de::DeserializeOwned;

use crate::response::ApiError;

/// Submitted HTML form
#[derive(Debug, Clone)]
pub struct FormBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| match e {
            FormRejection::InvalidFormContentType(e) => ApiError::InvalidForm(e.to_string()),
            FormRejection::FailedToDeserializeForm(e) => ApiError::InvalidForm(e.to_string()),
            FormRejection::FailedToDeserializeFormBody(e) => ApiError::InvalidForm(e.to_string()),
            FormRejection::BytesRejection(e) => ApiError::InvalidForm(e.to_string()),
            _ => ApiError::InvalidForm("Invalid form body".to_string()),
        })?;

        Ok(FormBody(value))
    }
}
