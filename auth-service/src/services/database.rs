//! PostgreSQL implementation of the store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{NewTodo, NewUser, Session, Todo, TodoChanges, TodoId, User, UserId};
use crate::services::store::{SessionStore, TodoStore, UserStore};
use crate::services::ServiceError;

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser, now: DateTime<Utc>) -> Result<User, ServiceError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, display_name, password_hash, role_code, created_utc)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ServiceError::ConflictExists
            }
            e => ServiceError::Database(e),
        })
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                ServiceError::Database(e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for Database {
    async fn insert_session(&self, session: &Session) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id, user_id, refresh_token, expiry_utc,
                user_agent, ip_address, is_active, created_utc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id)
        .bind(&session.refresh_token)
        .bind(session.expiry_utc)
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.is_active)
        .bind(session.created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, ServiceError> {
        let session =
            sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE refresh_token = $1")
                .bind(refresh_token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(session)
    }

    async fn find_active_sessions_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Session>, ServiceError> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT * FROM sessions
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY created_utc DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn deactivate_session(&self, session_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("UPDATE sessions SET is_active = FALSE WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn deactivate_user_sessions(&self, user_id: UserId) -> Result<(), ServiceError> {
        sqlx::query("UPDATE sessions SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn deactivate_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, ServiceError> {
        let result = sqlx::query(
            "UPDATE sessions SET is_active = FALSE WHERE expiry_utc < $1 AND is_active = TRUE",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TodoStore for Database {
    async fn list_todos_by_owner(&self, owner_id: UserId) -> Result<Vec<Todo>, ServiceError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT * FROM todos WHERE owner_id = $1 ORDER BY created_utc DESC, todo_id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn find_todo(&self, todo_id: TodoId) -> Result<Option<Todo>, ServiceError> {
        let todo = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE todo_id = $1")
            .bind(todo_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn insert_todo(&self, todo: NewTodo, now: DateTime<Utc>) -> Result<Todo, ServiceError> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (owner_id, title, completed, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(todo.owner_id)
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn update_todo(
        &self,
        todo_id: TodoId,
        changes: TodoChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, ServiceError> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = COALESCE($2, title),
                completed = COALESCE($3, completed),
                updated_utc = $4
            WHERE todo_id = $1
            RETURNING *
            "#,
        )
        .bind(todo_id)
        .bind(changes.title)
        .bind(changes.completed)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn delete_todo(&self, todo_id: TodoId) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM todos WHERE todo_id = $1")
            .bind(todo_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
