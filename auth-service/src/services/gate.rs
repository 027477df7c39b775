//! Authentication and authorization for one operation.
//!
//! Authentication always runs first: a missing or invalid credential is
//! `Unauthenticated` no matter what the operation requires.

use crate::models::Identity;
use crate::services::ability::{AbilityEngine, AbilitySet, Action, Resource, SubjectType};
use crate::services::jwt::TokenIssuer;
use crate::services::ServiceError;

/// A type-level rule an operation needs before any instance is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredRule {
    pub action: Action,
    pub subject: SubjectType,
}

pub const fn rule(action: Action, subject: SubjectType) -> RequiredRule {
    RequiredRule { action, subject }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewProfile,
    Logout,
    ListSessions,
    RevokeSession,
    RevokeAllSessions,
    ListTodos,
    ReadTodo,
    CreateTodo,
    UpdateTodo,
    DeleteTodo,
}

impl Operation {
    /// Rules that must all hold. Empty means authentication only.
    pub fn required_rules(self) -> &'static [RequiredRule] {
        const READ_TODO: [RequiredRule; 1] = [rule(Action::Read, SubjectType::Todo)];
        const CREATE_TODO: [RequiredRule; 1] = [rule(Action::Create, SubjectType::Todo)];
        const UPDATE_TODO: [RequiredRule; 1] = [rule(Action::Update, SubjectType::Todo)];
        const DELETE_TODO: [RequiredRule; 1] = [rule(Action::Delete, SubjectType::Todo)];

        match self {
            Operation::ViewProfile
            | Operation::Logout
            | Operation::ListSessions
            | Operation::RevokeSession
            | Operation::RevokeAllSessions => &[],
            Operation::ListTodos | Operation::ReadTodo => &READ_TODO,
            Operation::CreateTodo => &CREATE_TODO,
            Operation::UpdateTodo => &UPDATE_TODO,
            Operation::DeleteTodo => &DELETE_TODO,
        }
    }
}

/// An identity admitted to an operation, with the abilities it was judged by.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub identity: Identity,
    pub abilities: AbilitySet,
}

impl Authorized {
    /// Re-check against a loaded instance.
    pub fn require(&self, action: Action, resource: &dyn Resource) -> Result<(), ServiceError> {
        if self.abilities.can_on(action, resource) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.identity.id,
                action = %action,
                subject = %resource.subject_type(),
                "Permission denied on resource"
            );
            Err(ServiceError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: TokenIssuer,
}

impl AuthorizationGate {
    pub fn new(tokens: TokenIssuer) -> Self {
        Self { tokens }
    }

    pub fn authenticate(&self, credential: Option<&str>) -> Result<Identity, ServiceError> {
        let token = credential
            .filter(|t| !t.is_empty())
            .ok_or(ServiceError::Unauthenticated)?;

        self.tokens
            .verify(token)
            .map_err(|_| ServiceError::Unauthenticated)
    }

    pub fn authorize(
        &self,
        credential: Option<&str>,
        operation: Operation,
    ) -> Result<Authorized, ServiceError> {
        self.authorize_rules(credential, operation.required_rules())
    }

    /// Authenticate, then require every rule in `rules`.
    pub fn authorize_rules(
        &self,
        credential: Option<&str>,
        rules: &[RequiredRule],
    ) -> Result<Authorized, ServiceError> {
        let identity = self.authenticate(credential)?;
        let abilities = AbilityEngine::build_abilities(&identity);

        for required in rules {
            if !abilities.can(required.action, required.subject, None) {
                tracing::warn!(
                    user_id = %identity.id,
                    action = %required.action,
                    subject = %required.subject,
                    "Permission denied: missing ability"
                );
                return Err(ServiceError::Forbidden);
            }
        }

        Ok(Authorized {
            identity,
            abilities,
        })
    }
}
