//! Request body extractors that reject in the API envelope.

use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Like [`axum::Json`] on the request side, but a malformed, incomplete or
/// mistyped body turns into [`AppError::Validation`] instead of axum's
/// plain-text rejection.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(inner)) => Ok(JsonBody(inner)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::Validation("Expected a JSON request body".to_string())
            }
            other => AppError::Validation(other.body_text()),
        }
    }
}
