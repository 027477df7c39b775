//! In-process store used by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::models::{NewTodo, NewUser, Session, Todo, TodoChanges, TodoId, User, UserId};
use crate::services::store::{SessionStore, TodoStore, UserStore};
use crate::services::ServiceError;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<Session>,
    todos: Vec<Todo>,
    next_user_id: UserId,
    next_todo_id: TodoId,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, ServiceError> {
        self.tables
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Memory store mutex poisoned: {}", e)))
    }

    pub fn user_count(&self) -> usize {
        self.lock().map(|t| t.users.len()).unwrap_or(0)
    }

    /// Every session ever stored for the user, regardless of state.
    pub fn sessions_for(&self, user_id: UserId) -> Vec<Session> {
        self.lock()
            .map(|t| {
                t.sessions
                    .iter()
                    .filter(|s| s.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.lock().map(|t| t.sessions.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<User>, ServiceError> {
        let tables = self.lock()?;
        Ok(tables.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> Result<User, ServiceError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(ServiceError::ConflictExists);
        }

        tables.next_user_id += 1;
        let created = User {
            user_id: tables.next_user_id,
            email: user.email,
            display_name: user.display_name,
            password_hash: user.password_hash,
            role_code: user.role.as_str().to_string(),
            created_utc: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: &Session) -> Result<(), ServiceError> {
        let mut tables = self.lock()?;
        if tables
            .sessions
            .iter()
            .any(|s| s.refresh_token == session.refresh_token)
        {
            return Err(ServiceError::Internal(anyhow::anyhow!(
                "Duplicate refresh token"
            )));
        }
        tables.sessions.push(session.clone());
        Ok(())
    }

    async fn find_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, ServiceError> {
        let tables = self.lock()?;
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.refresh_token == refresh_token)
            .cloned())
    }

    async fn find_active_sessions_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Session>, ServiceError> {
        let tables = self.lock()?;
        let mut sessions: Vec<Session> = tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
        Ok(sessions)
    }

    async fn deactivate_session(&self, session_id: Uuid) -> Result<(), ServiceError> {
        let mut tables = self.lock()?;
        for session in tables.sessions.iter_mut().filter(|s| s.session_id == session_id) {
            session.is_active = false;
        }
        Ok(())
    }

    async fn deactivate_user_sessions(&self, user_id: UserId) -> Result<(), ServiceError> {
        let mut tables = self.lock()?;
        for session in tables.sessions.iter_mut().filter(|s| s.user_id == user_id) {
            session.is_active = false;
        }
        Ok(())
    }

    async fn deactivate_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        let mut tables = self.lock()?;
        let mut flipped = 0;
        for session in tables
            .sessions
            .iter_mut()
            .filter(|s| s.is_active && s.expiry_utc < now)
        {
            session.is_active = false;
            flipped += 1;
        }
        Ok(flipped)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_todos_by_owner(&self, owner_id: UserId) -> Result<Vec<Todo>, ServiceError> {
        let tables = self.lock()?;
        let mut todos: Vec<Todo> = tables
            .todos
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        todos.sort_by(|a, b| {
            b.created_utc
                .cmp(&a.created_utc)
                .then(b.todo_id.cmp(&a.todo_id))
        });
        Ok(todos)
    }

    async fn find_todo(&self, todo_id: TodoId) -> Result<Option<Todo>, ServiceError> {
        let tables = self.lock()?;
        Ok(tables.todos.iter().find(|t| t.todo_id == todo_id).cloned())
    }

    async fn insert_todo(&self, todo: NewTodo, now: DateTime<Utc>) -> Result<Todo, ServiceError> {
        let mut tables = self.lock()?;
        tables.next_todo_id += 1;
        let created = Todo {
            todo_id: tables.next_todo_id,
            owner_id: todo.owner_id,
            title: todo.title,
            completed: todo.completed,
            created_utc: now,
            updated_utc: now,
        };
        tables.todos.push(created.clone());
        Ok(created)
    }

    async fn update_todo(
        &self,
        todo_id: TodoId,
        changes: TodoChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, ServiceError> {
        let mut tables = self.lock()?;
        let Some(todo) = tables.todos.iter_mut().find(|t| t.todo_id == todo_id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            todo.title = title;
        }
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        todo.updated_utc = now;
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, todo_id: TodoId) -> Result<bool, ServiceError> {
        let mut tables = self.lock()?;
        let before = tables.todos.len();
        tables.todos.retain(|t| t.todo_id != todo_id);
        Ok(tables.todos.len() != before)
    }
}
