use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::dtos::ErrorResponse;

/// JSON body that has passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            reject(StatusCode::BAD_REQUEST, "Invalid JSON body", e.body_text())
        })?;

        value.validate().map_err(|e| {
            reject(StatusCode::BAD_REQUEST, "Validation error", e.to_string())
        })?;

        Ok(ValidatedJson(value))
    }
}

fn reject(status: StatusCode, error: &str, details: String) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
        details: Some(details),
    };
    (status, Json(body)).into_response()
}
