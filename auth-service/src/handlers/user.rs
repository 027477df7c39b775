use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{middleware::Credentials, models::UserResponse, services::Operation, AppState};

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse)
    ),
    tag = "User",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    credentials: Credentials,
) -> Result<Json<UserResponse>, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::ViewProfile)?;
    let user = state.auth_service.profile(&auth.identity).await?;
    Ok(Json(user))
}
