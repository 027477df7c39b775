//! Request extractors for credentials and client metadata. They never
//! reject: an absent credential is judged by the authorization gate.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use service_core::middleware::rate_limit::resolve_client_ip;
use std::convert::Infallible;

use crate::models::ClientInfo;
use crate::services::cookies::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::AppState;

/// Tokens presented with a request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Credentials {
    /// `access_token` cookie first, then `Authorization: Bearer`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let jar = CookieJar::from_headers(headers);
        let cookie_value = |name: &str| {
            jar.get(name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };

        let access_token = cookie_value(ACCESS_TOKEN_COOKIE).or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
        });

        Self {
            access_token,
            refresh_token: cookie_value(REFRESH_TOKEN_COOKIE),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Credentials::from_headers(&parts.headers))
    }
}

/// User agent and IP recorded on new sessions.
#[derive(Debug, Clone, Default)]
pub struct ClientContext(pub ClientInfo);

impl ClientContext {
    pub fn from_parts(parts: &Parts, trust_forwarded_for: bool) -> Self {
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.chars().take(512).collect());
        let ip_address = resolve_client_ip(&parts.headers, &parts.extensions, trust_forwarded_for)
            .map(|ip| ip.to_string());

        ClientContext(ClientInfo {
            user_agent,
            ip_address,
        })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for ClientContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientContext::from_parts(
            parts,
            state.config.security.trust_forwarded_for,
        ))
    }
}
