//! Session model - long-lived, revocable refresh sessions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Session lifetime, fixed from creation.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Where a session is in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Flag set and not yet expired. The only usable state.
    Active,
    /// Flag still set but past expiry; the sweep will revoke it.
    Expired,
    /// Flag cleared, explicitly or by the sweep.
    Revoked,
}

/// Session entity.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub refresh_token: String,
    pub expiry_utc: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}

/// Request metadata recorded on a new session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl Session {
    /// Create a new active session expiring `SESSION_TTL_DAYS` after `now`.
    pub fn new(user_id: UserId, refresh_token: String, client: ClientInfo, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            refresh_token,
            expiry_utc: now + Duration::days(SESSION_TTL_DAYS),
            user_agent: client.user_agent,
            ip_address: client.ip_address,
            is_active: true,
            created_utc: now,
        }
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if !self.is_active {
            SessionState::Revoked
        } else if now < self.expiry_utc {
            SessionState::Active
        } else {
            SessionState::Expired
        }
    }

    /// Usable for refresh iff active and unexpired.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == SessionState::Active
    }
}

/// Session info for API responses. Never carries the refresh token.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub expiry_utc: DateTime<Utc>,
    pub is_current: bool,
}

impl SessionInfo {
    pub fn from_session(session: Session, current_refresh_token: Option<&str>) -> Self {
        let is_current = current_refresh_token == Some(session.refresh_token.as_str());
        Self {
            session_id: session.session_id,
            user_agent: session.user_agent,
            ip_address: session.ip_address,
            created_utc: session.created_utc,
            expiry_utc: session.expiry_utc,
            is_current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(now: DateTime<Utc>) -> Session {
        Session::new(5, "token_abc".to_string(), ClientInfo::default(), now)
    }

    #[test]
    fn test_session_creation() {
        let now = Utc::now();
        let session = session_at(now);

        assert_eq!(session.user_id, 5);
        assert!(session.is_active);
        assert_eq!(session.created_utc, now);
        assert_eq!(session.expiry_utc - session.created_utc, Duration::days(7));
        assert!(session.is_usable_at(now));
    }

    #[test]
    fn test_session_expiry_is_lazy() {
        let now = Utc::now();
        let session = session_at(now);

        let later = now + Duration::days(7);
        assert!(session.is_active);
        assert_eq!(session.state_at(later), SessionState::Expired);
        assert!(!session.is_usable_at(later));
    }

    #[test]
    fn test_revoked_is_terminal() {
        let now = Utc::now();
        let mut session = session_at(now);
        session.is_active = false;

        assert_eq!(session.state_at(now), SessionState::Revoked);
        assert_eq!(session.state_at(now + Duration::days(30)), SessionState::Revoked);
    }

    #[test]
    fn test_session_info_marks_current() {
        let session = session_at(Utc::now());
        let info = SessionInfo::from_session(session.clone(), Some("token_abc"));
        assert!(info.is_current);

        let info = SessionInfo::from_session(session, Some("other"));
        assert!(!info.is_current);
    }
}
