use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use service_core::error::AppError;

use crate::{
    dtos::auth::{AuthResponse, RegisterRequest},
    handlers::cookies::apply_cookies,
    middleware::ClientContext,
    services::Registration,
    utils::{Password, ValidatedJson},
    AppState,
};

/// Register a new user and start a session
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; access and refresh cookies set", body = AuthResponse),
        (status = 400, description = "Validation error", body = crate::dtos::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::dtos::ErrorResponse),
        (status = 429, description = "Too many requests", body = crate::dtos::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::dtos::ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .register(
            Registration {
                email: req.email,
                password: Password::new(req.password),
                display_name: req.display_name,
            },
            client,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        apply_cookies(jar, outcome.cookies),
        Json(AuthResponse { user: outcome.user }),
    ))
}
