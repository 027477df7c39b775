mod common;

use auth_service::models::{ClientInfo, Role, TodoChanges};
use auth_service::services::{Operation, Registration, ServiceError};
use auth_service::utils::Password;
use chrono::Duration;
use common::{TestContext, ADMIN_EMAIL, PASSWORD};

const ALL_OPERATIONS: [Operation; 10] = [
    Operation::ViewProfile,
    Operation::Logout,
    Operation::ListSessions,
    Operation::RevokeSession,
    Operation::RevokeAllSessions,
    Operation::ListTodos,
    Operation::ReadTodo,
    Operation::CreateTodo,
    Operation::UpdateTodo,
    Operation::DeleteTodo,
];

/// Registers `email` and returns its access token.
async fn access_token(ctx: &TestContext, email: &str) -> String {
    let outcome = ctx
        .state
        .auth_service
        .register(
            Registration {
                email: email.to_string(),
                password: Password::new(PASSWORD),
                display_name: None,
            },
            ClientInfo::default(),
        )
        .await
        .unwrap();
    outcome
        .cookies
        .into_iter()
        .find(|c| c.name == "access_token")
        .unwrap()
        .value
}

#[tokio::test]
async fn test_missing_or_garbled_credential_is_unauthenticated() {
    let ctx = TestContext::new();

    for credential in [None, Some(""), Some("garbage"), Some("a.b.c")] {
        for operation in ALL_OPERATIONS {
            let result = ctx.state.gate.authorize(credential, operation);
            assert!(
                matches!(result, Err(ServiceError::Unauthenticated)),
                "{:?} with {:?}",
                operation,
                credential
            );
        }
    }
}

#[tokio::test]
async fn test_expired_credential_is_unauthenticated() {
    let ctx = TestContext::new();
    let token = access_token(&ctx, ADMIN_EMAIL).await;

    assert!(ctx.state.gate.authorize(Some(&token), Operation::ListTodos).is_ok());

    ctx.clock.advance(Duration::minutes(15));
    let result = ctx.state.gate.authorize(Some(&token), Operation::ListTodos);
    assert!(matches!(result, Err(ServiceError::Unauthenticated)));
}

#[tokio::test]
async fn test_identity_carries_role() {
    let ctx = TestContext::new();
    let admin = access_token(&ctx, ADMIN_EMAIL).await;
    let user = access_token(&ctx, "u@x.com").await;

    let admin = ctx.state.gate.authenticate(Some(&admin)).unwrap();
    let user = ctx.state.gate.authenticate(Some(&user)).unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn test_every_operation_admits_authenticated_users() {
    let ctx = TestContext::new();
    let token = access_token(&ctx, "u@x.com").await;

    for operation in ALL_OPERATIONS {
        assert!(ctx.state.gate.authorize(Some(&token), operation).is_ok());
    }
}

#[tokio::test]
async fn test_todo_instance_checks() {
    let ctx = TestContext::new();
    let todos = &ctx.state.todo_service;
    let gate = &ctx.state.gate;

    let alice_token = access_token(&ctx, "alice@x.com").await;
    let bob_token = access_token(&ctx, "bob@x.com").await;
    let admin_token = access_token(&ctx, ADMIN_EMAIL).await;

    let alice = gate.authorize(Some(&alice_token), Operation::CreateTodo).unwrap();
    let todo = todos.create(&alice, "  write tests  ", None).await.unwrap();
    assert_eq!(todo.title, "write tests");
    assert!(!todo.completed);
    assert_eq!(todo.owner_id, alice.identity.id);

    // Another user: forbidden on an existing todo, not-found on a missing one.
    let bob = gate.authorize(Some(&bob_token), Operation::ReadTodo).unwrap();
    assert!(matches!(todos.get(&bob, todo.todo_id).await, Err(ServiceError::Forbidden)));
    assert!(matches!(todos.get(&bob, 9999).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(
        todos.update(&bob, todo.todo_id, TodoChanges::default()).await,
        Err(ServiceError::Forbidden)
    ));
    assert!(matches!(todos.delete(&bob, todo.todo_id).await, Err(ServiceError::Forbidden)));
    assert!(todos.list(&bob).await.unwrap().is_empty());

    // Admin manages everything.
    let admin = gate.authorize(Some(&admin_token), Operation::UpdateTodo).unwrap();
    let updated = todos
        .update(
            &admin,
            todo.todo_id,
            TodoChanges {
                title: None,
                completed: Some(true),
            },
        )
        .await
        .unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "write tests");

    // Owner deletes.
    todos.delete(&alice, todo.todo_id).await.unwrap();
    assert!(matches!(
        todos.get(&alice, todo.todo_id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_create_todo_rejects_blank_title() {
    let ctx = TestContext::new();
    let token = access_token(&ctx, "u@x.com").await;
    let auth = ctx.state.gate.authorize(Some(&token), Operation::CreateTodo).unwrap();

    let result = ctx.state.todo_service.create(&auth, "   ", Some(true)).await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_list_todos_newest_first() {
    let ctx = TestContext::new();
    let token = access_token(&ctx, "u@x.com").await;

    for title in ["first", "second", "third"] {
        ctx.clock.advance(Duration::seconds(1));
        let auth = ctx.state.gate.authorize(Some(&token), Operation::CreateTodo).unwrap();
        ctx.state.todo_service.create(&auth, title, None).await.unwrap();
    }

    let auth = ctx.state.gate.authorize(Some(&token), Operation::ListTodos).unwrap();
    let titles: Vec<_> = ctx
        .state
        .todo_service
        .list(&auth)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[test]
fn test_required_rules_table() {
    use auth_service::services::{Action, SubjectType};

    assert!(Operation::ViewProfile.required_rules().is_empty());
    let rules = Operation::DeleteTodo.required_rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].action, Action::Delete);
    assert_eq!(rules[0].subject, SubjectType::Todo);
}

mod required_rules {
    use super::*;
    use auth_service::services::{Action, RequiredRule, SubjectType};

    const READ_AND_MANAGE: [RequiredRule; 2] = [
        RequiredRule {
            action: Action::Read,
            subject: SubjectType::Todo,
        },
        RequiredRule {
            action: Action::Manage,
            subject: SubjectType::All,
        },
    ];

    #[tokio::test]
    async fn test_user_missing_one_rule_is_forbidden() {
        let ctx = TestContext::new();
        let token = access_token(&ctx, "u@x.com").await;

        // The first rule alone is satisfied.
        assert!(ctx
            .state
            .gate
            .authorize_rules(Some(&token), &READ_AND_MANAGE[..1])
            .is_ok());

        let result = ctx.state.gate.authorize_rules(Some(&token), &READ_AND_MANAGE);
        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn test_admin_satisfies_every_rule() {
        let ctx = TestContext::new();
        let token = access_token(&ctx, ADMIN_EMAIL).await;

        let auth = ctx
            .state
            .gate
            .authorize_rules(Some(&token), &READ_AND_MANAGE)
            .unwrap();
        assert_eq!(auth.identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_unauthenticated_masks_forbidden() {
        let ctx = TestContext::new();

        for credential in [None, Some("garbage")] {
            let result = ctx.state.gate.authorize_rules(credential, &READ_AND_MANAGE);
            assert!(matches!(result, Err(ServiceError::Unauthenticated)));
        }
    }
}
