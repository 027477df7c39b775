pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use metrics_exporter_prometheus::PrometheusHandle;
use service_core::axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{ip_rate_limit_middleware, IpRateLimit},
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::config::AuthConfig;
use crate::services::{
    cookies::ACCESS_TOKEN_COOKIE, AuthService, AuthorizationGate, CookiePolicy,
    CredentialVerifier, SessionManager, SessionStore, TodoService, TodoStore, TokenIssuer,
    UserStore,
};
use crate::utils::{Clock, CredentialHasher};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::registration::register,
        handlers::auth::session::login,
        handlers::auth::session::logout,
        handlers::auth::session::refresh,
        handlers::auth::session::list_sessions,
        handlers::auth::session::revoke_session,
        handlers::auth::session::revoke_all_sessions,
        handlers::user::get_profile,
        handlers::todo::list_todos,
        handlers::todo::create_todo,
        handlers::todo::get_todo,
        handlers::todo::update_todo,
        handlers::todo::delete_todo,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::MessageResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::LoginRequest,
            dtos::auth::AuthResponse,
            dtos::todo::CreateTodoRequest,
            dtos::todo::UpdateTodoRequest,
            models::Role,
            models::UserResponse,
            models::SessionInfo,
            models::Todo,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and logout"),
        (name = "Sessions", description = "Refresh and revocable session management"),
        (name = "User", description = "Current user"),
        (name = "Todos", description = "Owner-scoped todo resource"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_TOKEN_COOKIE))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Backing stores for the service. Postgres in production, `MemoryStore` in tests.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub todos: Arc<dyn TodoStore>,
}

impl Stores {
    /// One value implementing every store trait.
    pub fn shared<T>(store: Arc<T>) -> Self
    where
        T: UserStore + SessionStore + TodoStore + 'static,
    {
        Self {
            users: store.clone(),
            sessions: store.clone(),
            todos: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AuthConfig,
    pub users: Arc<dyn UserStore>,
    pub gate: AuthorizationGate,
    pub sessions: SessionManager,
    pub auth_service: AuthService,
    pub todo_service: TodoService,
    pub metrics: Option<PrometheusHandle>,
    pub login_rate_limiter: IpRateLimit,
    pub register_rate_limiter: IpRateLimit,
}

impl AppState {
    pub fn new(
        config: AuthConfig,
        stores: Stores,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self, AppError> {
        let tokens = TokenIssuer::new(&config.jwt.secret, clock.clone())
            .map_err(AppError::ConfigError)?;

        let credentials = CredentialVerifier::new(stores.users.clone(), hasher);
        let sessions = SessionManager::new(
            stores.sessions.clone(),
            stores.users.clone(),
            tokens.clone(),
            clock.clone(),
        );
        let auth_service = AuthService::new(
            stores.users.clone(),
            credentials,
            sessions.clone(),
            tokens.clone(),
            CookiePolicy::new(config.secure_cookies()),
            &config.security.admin_emails,
            clock.clone(),
        );
        let todo_service = TodoService::new(stores.todos.clone(), clock);

        let trust_forwarded_for = config.security.trust_forwarded_for;
        let login_rate_limiter = IpRateLimit::new(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
            trust_forwarded_for,
        );
        let register_rate_limiter = IpRateLimit::new(
            config.rate_limit.register_attempts,
            config.rate_limit.register_window_seconds,
            trust_forwarded_for,
        );

        Ok(Self {
            config,
            users: stores.users,
            gate: AuthorizationGate::new(tokens),
            sessions,
            auth_service,
            todo_service,
            metrics,
            login_rate_limiter,
            register_rate_limiter,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let login_route = Router::new()
        .route("/auth/login", post(handlers::login))
        .layer(from_fn_with_state(
            state.login_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let register_route = Router::new()
        .route("/auth/register", post(handlers::register))
        .layer(from_fn_with_state(
            state.register_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let session_routes = Router::new()
        .route("/auth/profile", get(handlers::get_profile))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/sessions/refresh", post(handlers::refresh))
        .route(
            "/auth/sessions",
            get(handlers::list_sessions).delete(handlers::revoke_all_sessions),
        )
        .route(
            "/auth/sessions/:session_id",
            service_core::axum::routing::delete(handlers::revoke_session),
        );

    let todo_routes = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/:todo_id",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(login_route)
        .merge(register_route)
        .merge(session_routes)
        .merge(todo_routes)
        .with_state(state.clone())
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &service_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config))
}

fn cors_layer(config: &AuthConfig) -> CorsLayer {
    // Cookies need credentialed CORS, which forbids a wildcard origin.
    let origins: Vec<HeaderValue> = config
        .security
        .allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Store unreachable", body = dtos::ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.users.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Store health check failed");
        AppError::from(e)
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "database": "up"
        }
    })))
}
