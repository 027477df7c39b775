//! Account flows: registration, login, logout, profile and session management.
//! Every flow ends in cookie descriptors for the HTTP layer to apply.

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{ClientInfo, Identity, NewUser, Role, SessionInfo, User, UserResponse};
use crate::services::cookies::{CookieDescriptor, CookiePolicy};
use crate::services::credentials::{normalize_email, CredentialVerifier};
use crate::services::jwt::TokenIssuer;
use crate::services::session::SessionManager;
use crate::services::store::UserStore;
use crate::services::ServiceError;
use crate::utils::{Clock, Password};

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: Password,
    pub display_name: Option<String>,
}

/// Result of a successful register or login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: UserResponse,
    pub cookies: Vec<CookieDescriptor>,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    credentials: CredentialVerifier,
    sessions: SessionManager,
    tokens: TokenIssuer,
    cookies: CookiePolicy,
    admin_emails: Arc<HashSet<String>>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        credentials: CredentialVerifier,
        sessions: SessionManager,
        tokens: TokenIssuer,
        cookies: CookiePolicy,
        admin_emails: &[String],
        clock: Arc<dyn Clock>,
    ) -> Self {
        let admin_emails = admin_emails.iter().map(|e| normalize_email(e)).collect();
        Self {
            users,
            credentials,
            sessions,
            tokens,
            cookies,
            admin_emails: Arc::new(admin_emails),
            clock,
        }
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        self.cookies
    }

    pub async fn register(
        &self,
        registration: Registration,
        client: ClientInfo,
    ) -> Result<AuthOutcome, ServiceError> {
        let email = normalize_email(&registration.email);
        self.credentials.check_available(&email).await?;

        let password_hash = self.credentials.hash(&registration.password)?;
        let role = if self.admin_emails.contains(&email) {
            Role::Admin
        } else {
            Role::User
        };

        let user = self
            .users
            .create_user(
                NewUser {
                    email,
                    display_name: registration.display_name,
                    password_hash,
                    role,
                },
                self.clock.now(),
            )
            .await?;

        tracing::info!(user_id = %user.user_id, role = role.as_str(), "User registered");

        self.start_session(user, client).await
    }

    pub async fn login(
        &self,
        email: &str,
        password: &Password,
        client: ClientInfo,
    ) -> Result<AuthOutcome, ServiceError> {
        let user = match self.credentials.verify_user(email, password).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Login failed: invalid credentials");
                return Err(e);
            }
        };

        tracing::info!(user_id = %user.user_id, "User logged in");
        self.start_session(user, client).await
    }

    async fn start_session(&self, user: User, client: ClientInfo) -> Result<AuthOutcome, ServiceError> {
        let session = self.sessions.create_session(user.user_id, client).await?;
        let access_token = self.tokens.issue(&user.identity())?;

        Ok(AuthOutcome {
            user: user.sanitized(),
            cookies: vec![
                self.cookies.access_token(access_token),
                self.cookies.refresh_token(session.refresh_token),
            ],
        })
    }

    pub async fn profile(&self, identity: &Identity) -> Result<UserResponse, ServiceError> {
        self.users
            .find_user_by_id(identity.id)
            .await?
            .map(|u| u.sanitized())
            .ok_or_else(|| ServiceError::NotFound("User".to_string()))
    }

    /// Clears both cookies and revokes the session behind `refresh_token`
    /// when it belongs to the caller.
    pub async fn logout(
        &self,
        identity: &Identity,
        refresh_token: Option<&str>,
    ) -> Result<Vec<CookieDescriptor>, ServiceError> {
        if let Some(token) = refresh_token {
            match self.sessions.validate_refresh_token(token).await {
                Ok(session) if session.user_id == identity.id => {
                    self.sessions.invalidate_session(session.session_id).await?;
                }
                Ok(_) | Err(ServiceError::InvalidToken) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::info!(user_id = %identity.id, "User logged out");
        Ok(self.cookies.clear_both())
    }

    /// New access cookie for a valid refresh token. No access credential needed.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<CookieDescriptor, ServiceError> {
        let token = refresh_token.ok_or(ServiceError::InvalidToken)?;
        let access_token = self.sessions.refresh_access_token(token).await?;
        Ok(self.cookies.access_token(access_token))
    }

    pub async fn list_sessions(
        &self,
        identity: &Identity,
        current_refresh_token: Option<&str>,
    ) -> Result<Vec<SessionInfo>, ServiceError> {
        let sessions = self.sessions.list_active_sessions(identity.id).await?;
        Ok(sessions
            .into_iter()
            .map(|s| SessionInfo::from_session(s, current_refresh_token))
            .collect())
    }

    /// Revoke one of the caller's active sessions. Returns clearing cookies
    /// when it was the session making the request.
    pub async fn revoke_session(
        &self,
        identity: &Identity,
        session_id: Uuid,
        current_refresh_token: Option<&str>,
    ) -> Result<Vec<CookieDescriptor>, ServiceError> {
        let session = self
            .sessions
            .list_active_sessions(identity.id)
            .await?
            .into_iter()
            .find(|s| s.session_id == session_id)
            .ok_or_else(|| ServiceError::NotFound("Session".to_string()))?;

        self.sessions.invalidate_session(session.session_id).await?;

        if current_refresh_token == Some(session.refresh_token.as_str()) {
            Ok(self.cookies.clear_both())
        } else {
            Ok(Vec::new())
        }
    }

    pub async fn revoke_all_sessions(
        &self,
        identity: &Identity,
    ) -> Result<Vec<CookieDescriptor>, ServiceError> {
        self.sessions.invalidate_all_user_sessions(identity.id).await?;
        Ok(self.cookies.clear_both())
    }
}
