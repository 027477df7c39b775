mod common;

use auth_service::models::{ClientInfo, Identity, Role};
use auth_service::services::{
    AbilityEngine, Action, Registration, ServiceError, SubjectType,
};
use auth_service::services::ability::Resource;
use auth_service::utils::Password;
use chrono::Duration;
use common::{TestContext, PASSWORD};

struct OwnedTodo(i64);

impl Resource for OwnedTodo {
    fn subject_type(&self) -> SubjectType {
        SubjectType::Todo
    }

    fn owner_id(&self) -> Option<i64> {
        Some(self.0)
    }
}

fn registration(email: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: Password::new(PASSWORD),
        display_name: None,
    }
}

fn client() -> ClientInfo {
    ClientInfo {
        user_agent: Some("integration-test".to_string()),
        ip_address: Some("127.0.0.1".to_string()),
    }
}

#[tokio::test]
async fn test_scenario_walkthrough() {
    let ctx = TestContext::new();
    let auth = &ctx.state.auth_service;
    let sessions = &ctx.state.sessions;
    let t0 = ctx.clock_now();

    // 1. Register: one session, seven days, access credential valid now.
    let outcome = auth.register(registration("a@x.com"), client()).await.unwrap();
    let user_id = outcome.user.user_id;
    let stored = ctx.store.sessions_for(user_id);
    assert_eq!(stored.len(), 1);
    let s1 = stored[0].clone();
    assert_eq!(s1.expiry_utc, t0 + Duration::days(7));
    assert_eq!(s1.user_agent.as_deref(), Some("integration-test"));
    assert_eq!(s1.ip_address.as_deref(), Some("127.0.0.1"));

    let access = outcome
        .cookies
        .iter()
        .find(|c| c.name == "access_token")
        .unwrap()
        .value
        .clone();
    let identity = ctx.state.gate.authenticate(Some(&access)).unwrap();
    assert_eq!(identity.id, user_id);
    assert_eq!(identity.role, Role::User);

    let refresh = outcome
        .cookies
        .iter()
        .find(|c| c.name == "refresh_token")
        .unwrap()
        .value
        .clone();
    assert_eq!(refresh, s1.refresh_token);

    // 2. Same email again.
    let dup = auth.register(registration("a@x.com"), client()).await;
    assert!(matches!(dup, Err(ServiceError::ConflictExists)));

    // 3. Wrong password, no new session.
    let bad = auth
        .login("a@x.com", &Password::new("wrong-password"), client())
        .await;
    assert!(matches!(bad, Err(ServiceError::InvalidCredentials)));
    assert_eq!(ctx.store.sessions_for(user_id).len(), 1);

    // 4. Refresh twice with the same token.
    let first = sessions.refresh_access_token(&refresh).await.unwrap();
    ctx.clock.advance(Duration::seconds(1));
    let second = sessions.refresh_access_token(&refresh).await.unwrap();
    assert_eq!(ctx.state.gate.authenticate(Some(&first)).unwrap().id, user_id);
    assert_eq!(ctx.state.gate.authenticate(Some(&second)).unwrap().id, user_id);

    // 5. Revoke, then refresh fails.
    sessions.invalidate_session(s1.session_id).await.unwrap();
    let after = sessions.refresh_access_token(&refresh).await;
    assert!(matches!(after, Err(ServiceError::InvalidToken)));

    // 6. Owner-conditioned abilities.
    let user = Identity {
        id: 5,
        email: "u@x.com".to_string(),
        role: Role::User,
    };
    let abilities = AbilityEngine::build_abilities(&user);
    assert!(abilities.can(Action::Read, SubjectType::Todo, Some(&OwnedTodo(5))));
    assert!(!abilities.can(Action::Read, SubjectType::Todo, Some(&OwnedTodo(7))));
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let ctx = TestContext::new();
    ctx.state
        .auth_service
        .register(registration("  Mixed@Example.com "), client())
        .await
        .unwrap();

    let outcome = ctx
        .state
        .auth_service
        .login("mixed@example.COM", &Password::new(PASSWORD), client())
        .await
        .unwrap();
    assert_eq!(outcome.user.email, "mixed@example.com");
}

#[tokio::test]
async fn test_unknown_email_matches_wrong_password() {
    let ctx = TestContext::new();
    let result = ctx
        .state
        .auth_service
        .login("nobody@x.com", &Password::new(PASSWORD), client())
        .await;

    assert!(matches!(result, Err(ServiceError::InvalidCredentials)));
    assert_eq!(ctx.store.session_count(), 0);
}

#[tokio::test]
async fn test_admin_email_bootstrap() {
    let ctx = TestContext::new();
    let outcome = ctx
        .state
        .auth_service
        .register(registration(common::ADMIN_EMAIL), client())
        .await
        .unwrap();

    assert_eq!(outcome.user.role, Role::Admin);
}

#[tokio::test]
async fn test_logout_revokes_only_current_session() {
    let ctx = TestContext::new();
    let auth = &ctx.state.auth_service;

    let first = auth.register(registration("a@x.com"), client()).await.unwrap();
    ctx.clock.advance(Duration::minutes(1));
    let second = auth
        .login("a@x.com", &Password::new(PASSWORD), client())
        .await
        .unwrap();

    let identity = ctx.state.gate.authenticate(Some(&second.cookies[0].value)).unwrap();
    let cleared = auth
        .logout(&identity, Some(&second.cookies[1].value))
        .await
        .unwrap();
    assert!(cleared.iter().all(|c| c.is_clearing()));

    let active = ctx.state.sessions.list_active_sessions(identity.id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].refresh_token, first.cookies[1].value);
}

#[tokio::test]
async fn test_logout_ignores_foreign_refresh_token() {
    let ctx = TestContext::new();
    let auth = &ctx.state.auth_service;

    let alice = auth.register(registration("alice@x.com"), client()).await.unwrap();
    let bob = auth.register(registration("bob@x.com"), client()).await.unwrap();

    let alice_identity = ctx.state.gate.authenticate(Some(&alice.cookies[0].value)).unwrap();
    auth.logout(&alice_identity, Some(&bob.cookies[1].value))
        .await
        .unwrap();

    assert!(ctx
        .state
        .sessions
        .validate_refresh_token(&bob.cookies[1].value)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_profile_returns_sanitized_user() {
    let ctx = TestContext::new();
    let outcome = ctx
        .state
        .auth_service
        .register(
            Registration {
                display_name: Some("Ada".to_string()),
                ..registration("ada@x.com")
            },
            client(),
        )
        .await
        .unwrap();

    let identity = ctx.state.gate.authenticate(Some(&outcome.cookies[0].value)).unwrap();
    let profile = ctx.state.auth_service.profile(&identity).await.unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Ada"));

    let json = serde_json::to_value(&profile).unwrap();
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn test_user_and_session_share_the_injected_clock() {
    let ctx = TestContext::new();
    let outcome = ctx
        .state
        .auth_service
        .register(registration("clock@x.com"), client())
        .await
        .unwrap();

    assert_eq!(outcome.user.created_utc, ctx.clock_now());
    let sessions = ctx.store.sessions_for(outcome.user.user_id);
    assert_eq!(sessions[0].created_utc, outcome.user.created_utc);
}
