//! Todo model - the example resource guarded by abilities.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::services::ability::{Resource, SubjectType};
use super::user::UserId;

pub type TodoId = i64;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Todo {
    pub todo_id: TodoId,
    pub owner_id: UserId,
    pub title: String,
    pub completed: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// A todo that does not exist yet; checked against abilities before insert.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub owner_id: UserId,
    pub title: String,
    pub completed: bool,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl Resource for Todo {
    fn subject_type(&self) -> SubjectType {
        SubjectType::Todo
    }

    fn owner_id(&self) -> Option<UserId> {
        Some(self.owner_id)
    }
}

impl Resource for NewTodo {
    fn subject_type(&self) -> SubjectType {
        SubjectType::Todo
    }

    fn owner_id(&self) -> Option<UserId> {
        Some(self.owner_id)
    }
}
