//! JSON body extractor that rejects with the standard error envelope.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// Drop-in replacement for `axum::Json` as an extractor.
///
/// Missing content type, malformed JSON and type mismatches all become a
/// 400 `BadRequest` envelope instead of axum's plain-text rejection.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::JsonBody;
/// use serde_json::Value;
///
/// async fn enqueue(JsonBody(payload): JsonBody<Value>) -> String {
///     payload.to_string()
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}
