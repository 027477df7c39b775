//! Session lifecycle: creation, refresh, revocation, listing and the expiry sweep.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::{ClientInfo, Session, UserId};
use crate::services::jwt::TokenIssuer;
use crate::services::store::{SessionStore, UserStore};
use crate::services::ServiceError;
use crate::utils::Clock;

/// Refresh tokens carry 256 bits from the thread-local CSPRNG.
const REFRESH_TOKEN_BYTES: usize = 32;

fn generate_refresh_token() -> String {
    let bytes: [u8; REFRESH_TOKEN_BYTES] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        tokens: TokenIssuer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            users,
            tokens,
            clock,
        }
    }

    pub async fn create_session(
        &self,
        user_id: UserId,
        client: ClientInfo,
    ) -> Result<Session, ServiceError> {
        let session = Session::new(user_id, generate_refresh_token(), client, self.clock.now());
        self.sessions.insert_session(&session).await?;

        tracing::info!(
            user_id = %user_id,
            session_id = %session.session_id,
            "Session created"
        );
        Ok(session)
    }

    /// The session behind `refresh_token`, if it is active and unexpired.
    pub async fn validate_refresh_token(&self, refresh_token: &str) -> Result<Session, ServiceError> {
        if refresh_token.is_empty() {
            return Err(ServiceError::InvalidToken);
        }

        let session = self
            .sessions
            .find_session_by_refresh_token(refresh_token)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        if !session.is_usable_at(self.clock.now()) {
            tracing::debug!(session_id = %session.session_id, "Refresh with unusable session");
            return Err(ServiceError::InvalidToken);
        }

        Ok(session)
    }

    /// Mint a new access credential. The refresh token stays valid.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ServiceError> {
        let session = self.validate_refresh_token(refresh_token).await?;

        let user = self
            .users
            .find_user_by_id(session.user_id)
            .await?
            .ok_or(ServiceError::InvalidToken)?;

        let token = self.tokens.issue(&user.identity())?;
        tracing::debug!(user_id = %user.user_id, session_id = %session.session_id, "Access token refreshed");
        Ok(token)
    }

    pub async fn invalidate_session(&self, session_id: Uuid) -> Result<(), ServiceError> {
        self.sessions.deactivate_session(session_id).await?;
        tracing::info!(session_id = %session_id, "Session revoked");
        Ok(())
    }

    pub async fn invalidate_all_user_sessions(&self, user_id: UserId) -> Result<(), ServiceError> {
        self.sessions.deactivate_user_sessions(user_id).await?;
        tracing::info!(user_id = %user_id, "All sessions revoked");
        Ok(())
    }

    /// Sessions with the active flag set, newest first. Includes expired
    /// sessions the sweep has not reached yet.
    pub async fn list_active_sessions(&self, user_id: UserId) -> Result<Vec<Session>, ServiceError> {
        self.sessions.find_active_sessions_by_user(user_id).await
    }

    pub async fn sweep_expired(&self) -> Result<u64, ServiceError> {
        let flipped = self
            .sessions
            .deactivate_expired_sessions(self.clock.now())
            .await?;
        if flipped > 0 {
            tracing::info!(count = flipped, "Deactivated expired sessions");
        }
        Ok(flipped)
    }
}

/// Run `sweep_expired` every `interval` until `shutdown_rx` fires.
pub fn spawn_expiry_sweeper(
    manager: SessionManager,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = ticker.tick() => {
                    if let Err(e) = manager.sweep_expired().await {
                        tracing::error!(error = %e, "Session sweep failed");
                    }
                }
            }
        }
        tracing::info!("Session sweeper stopped");
    })
}
