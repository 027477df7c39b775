//! Ability-based authorization.
//!
//! An [`AbilitySet`] is an ordered list of [`CapabilityRule`]s built fresh for
//! one identity. Admins get a single `manage all` rule. Users get CRUD on
//! their own todos, each rule conditioned on ownership.
//!
//! Checks made without a resource instance skip rule conditions, so callers
//! that later load the instance must check again with it.

use serde::Serialize;
use std::fmt;

use crate::models::{Identity, Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Wildcard: matches every requested action.
    Manage,
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubjectType {
    Todo,
    /// Wildcard: matches every requested subject.
    All,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Manage => "manage",
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(s)
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::Todo => f.write_str("Todo"),
            SubjectType::All => f.write_str("all"),
        }
    }
}

/// Attribute access for rule conditions.
pub trait Resource {
    fn subject_type(&self) -> SubjectType;
    fn owner_id(&self) -> Option<UserId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// `resource.owner_id == user_id`
    OwnedBy(UserId),
}

impl Condition {
    fn holds(&self, resource: &dyn Resource) -> bool {
        match self {
            Condition::OwnedBy(user_id) => resource.owner_id() == Some(*user_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityRule {
    pub action: Action,
    pub subject: SubjectType,
    pub condition: Option<Condition>,
}

impl CapabilityRule {
    pub const fn new(action: Action, subject: SubjectType) -> Self {
        Self {
            action,
            subject,
            condition: None,
        }
    }

    pub const fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn matches(
        &self,
        action: Action,
        subject: SubjectType,
        resource: Option<&dyn Resource>,
    ) -> bool {
        let action_matches = self.action == Action::Manage || self.action == action;
        let subject_matches = self.subject == SubjectType::All || self.subject == subject;
        if !action_matches || !subject_matches {
            return false;
        }

        match (&self.condition, resource) {
            (Some(condition), Some(resource)) => condition.holds(resource),
            _ => true,
        }
    }
}

/// `manage all`.
#[derive(Debug, Clone)]
pub struct AdminAbility {
    rules: [CapabilityRule; 1],
}

impl AdminAbility {
    pub fn new() -> Self {
        Self {
            rules: [CapabilityRule::new(Action::Manage, SubjectType::All)],
        }
    }
}

impl Default for AdminAbility {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner-conditioned CRUD on todos.
#[derive(Debug, Clone)]
pub struct UserAbility {
    rules: [CapabilityRule; 4],
}

impl UserAbility {
    pub fn for_user(user_id: UserId) -> Self {
        let owned = Condition::OwnedBy(user_id);
        Self {
            rules: [
                CapabilityRule::new(Action::Create, SubjectType::Todo).when(owned),
                CapabilityRule::new(Action::Read, SubjectType::Todo).when(owned),
                CapabilityRule::new(Action::Update, SubjectType::Todo).when(owned),
                CapabilityRule::new(Action::Delete, SubjectType::Todo).when(owned),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum AbilitySet {
    Admin(AdminAbility),
    User(UserAbility),
}

impl AbilitySet {
    pub fn rules(&self) -> &[CapabilityRule] {
        match self {
            AbilitySet::Admin(a) => &a.rules,
            AbilitySet::User(u) => &u.rules,
        }
    }

    pub fn can(
        &self,
        action: Action,
        subject: SubjectType,
        resource: Option<&dyn Resource>,
    ) -> bool {
        self.rules()
            .iter()
            .any(|rule| rule.matches(action, subject, resource))
    }

    /// Instance-level check using the resource's own subject type.
    pub fn can_on(&self, action: Action, resource: &dyn Resource) -> bool {
        self.can(action, resource.subject_type(), Some(resource))
    }
}

/// Builds ability sets. Pure and stateless.
#[derive(Debug, Clone, Copy)]
pub struct AbilityEngine;

impl AbilityEngine {
    pub fn build_abilities(identity: &Identity) -> AbilitySet {
        match identity.role {
            Role::Admin => AbilitySet::Admin(AdminAbility::new()),
            Role::User => AbilitySet::User(UserAbility::for_user(identity.id)),
        }
    }
}
