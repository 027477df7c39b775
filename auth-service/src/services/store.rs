//! Persistence collaborators. `Database` backs them with Postgres,
//! `MemoryStore` keeps everything in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewTodo, NewUser, Session, Todo, TodoChanges, TodoId, User, UserId};
use crate::services::ServiceError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;

    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<User>, ServiceError>;

    /// Atomic with respect to the email uniqueness check. Fails with
    /// `ConflictExists` when the email is taken.
    async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> Result<User, ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<(), ServiceError>;

    async fn find_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, ServiceError>;

    /// Sessions with the active flag set, newest first. Expiry is not checked.
    async fn find_active_sessions_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Session>, ServiceError>;

    async fn deactivate_session(&self, session_id: Uuid) -> Result<(), ServiceError>;

    async fn deactivate_user_sessions(&self, user_id: UserId) -> Result<(), ServiceError>;

    /// Clears the active flag on every session with `expiry_utc < now`.
    /// Returns the number of sessions changed.
    async fn deactivate_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, ServiceError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Newest first.
    async fn list_todos_by_owner(&self, owner_id: UserId) -> Result<Vec<Todo>, ServiceError>;

    async fn find_todo(&self, todo_id: TodoId) -> Result<Option<Todo>, ServiceError>;

    async fn insert_todo(&self, todo: NewTodo, now: DateTime<Utc>) -> Result<Todo, ServiceError>;

    async fn update_todo(
        &self,
        todo_id: TodoId,
        changes: TodoChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, ServiceError>;

    /// Returns whether a row was removed.
    async fn delete_todo(&self, todo_id: TodoId) -> Result<bool, ServiceError>;
}
