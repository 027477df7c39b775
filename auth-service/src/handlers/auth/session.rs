use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{
        auth::{AuthResponse, LoginRequest},
        MessageResponse,
    },
    handlers::cookies::apply_cookies,
    middleware::{ClientContext, Credentials},
    models::SessionInfo,
    services::Operation,
    utils::{Password, ValidatedJson},
    AppState,
};

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; access and refresh cookies set", body = AuthResponse),
        (status = 400, description = "Validation error", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::dtos::ErrorResponse),
        (status = 429, description = "Too many requests", body = crate::dtos::ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ClientContext(client): ClientContext,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .login(&req.email, &Password::new(req.password), client)
        .await?;

    Ok((
        apply_cookies(jar, outcome.cookies),
        Json(AuthResponse { user: outcome.user }),
    ))
}

/// Logout: clear cookies and revoke the current session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out; cookies cleared", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse)
    ),
    tag = "Authentication",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    credentials: Credentials,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::Logout)?;
    let cookies = state
        .auth_service
        .logout(&auth.identity, credentials.refresh_token())
        .await?;

    Ok((
        apply_cookies(jar, cookies),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// Issue a new access token from the refresh cookie
#[utoipa::path(
    post,
    path = "/auth/sessions/refresh",
    responses(
        (status = 200, description = "Access cookie renewed", body = MessageResponse),
        (status = 401, description = "Missing, unknown, revoked or expired refresh token", body = crate::dtos::ErrorResponse)
    ),
    tag = "Sessions"
)]
pub async fn refresh(
    State(state): State<AppState>,
    credentials: Credentials,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let cookie = state
        .auth_service
        .refresh(credentials.refresh_token())
        .await?;

    Ok((
        apply_cookies(jar, vec![cookie]),
        Json(MessageResponse::new("Token refreshed")),
    ))
}

/// List the caller's active sessions
#[utoipa::path(
    get,
    path = "/auth/sessions",
    responses(
        (status = 200, description = "Active sessions, newest first", body = Vec<SessionInfo>),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse)
    ),
    tag = "Sessions",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    credentials: Credentials,
) -> Result<Json<Vec<SessionInfo>>, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::ListSessions)?;
    let sessions = state
        .auth_service
        .list_sessions(&auth.identity, credentials.refresh_token())
        .await?;

    Ok(Json(sessions))
}

/// Revoke one of the caller's sessions
#[utoipa::path(
    delete,
    path = "/auth/sessions/{session_id}",
    params(("session_id" = Uuid, Path, description = "Session to revoke")),
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 404, description = "No such active session for this user", body = crate::dtos::ErrorResponse)
    ),
    tag = "Sessions",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn revoke_session(
    State(state): State<AppState>,
    credentials: Credentials,
    jar: CookieJar,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::RevokeSession)?;
    let cookies = state
        .auth_service
        .revoke_session(&auth.identity, session_id, credentials.refresh_token())
        .await?;

    Ok((
        apply_cookies(jar, cookies),
        Json(MessageResponse::new("Session revoked")),
    ))
}

/// Revoke every session of the caller
#[utoipa::path(
    delete,
    path = "/auth/sessions",
    responses(
        (status = 200, description = "All sessions revoked; cookies cleared", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse)
    ),
    tag = "Sessions",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn revoke_all_sessions(
    State(state): State<AppState>,
    credentials: Credentials,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::RevokeAllSessions)?;
    let cookies = state.auth_service.revoke_all_sessions(&auth.identity).await?;

    Ok((
        StatusCode::OK,
        apply_cookies(jar, cookies),
        Json(MessageResponse::new("All sessions revoked")),
    ))
}
