//! JSON body extractor that runs `validator` rules before the handler.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::AppJson;
use crate::errors::{AppError, FieldErrors};

/// A deserialized body whose `Validate` rules all passed.
///
/// A body that is not JSON, or does not fit `T`, is rejected with
/// `AppError::Validation`. Rule violations are rejected with
/// `AppError::ValidationFailed`, keyed by the camelCase field name.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(body) = AppJson::<T>::from_request(req, state).await?;

        if let Err(errors) = body.validate() {
            return Err(AppError::ValidationFailed(FieldErrors::from(errors)));
        }

        Ok(Self(body))
    }
}
