//! Todo operations. Type-level abilities are checked by the gate before these
//! run; each instance is re-checked here once loaded.

use std::sync::Arc;

use crate::models::{NewTodo, Todo, TodoChanges, TodoId};
use crate::services::ability::Action;
use crate::services::gate::Authorized;
use crate::services::store::TodoStore;
use crate::services::ServiceError;
use crate::utils::Clock;

fn clean_title(title: &str) -> Result<String, ServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ServiceError::Validation("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoStore>,
    clock: Arc<dyn Clock>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoStore>, clock: Arc<dyn Clock>) -> Self {
        Self { todos, clock }
    }

    /// The caller's own todos, newest first. Admins see their own as well.
    pub async fn list(&self, auth: &Authorized) -> Result<Vec<Todo>, ServiceError> {
        self.todos.list_todos_by_owner(auth.identity.id).await
    }

    async fn load(&self, auth: &Authorized, todo_id: TodoId, action: Action) -> Result<Todo, ServiceError> {
        let todo = self
            .todos
            .find_todo(todo_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Todo".to_string()))?;
        auth.require(action, &todo)?;
        Ok(todo)
    }

    pub async fn get(&self, auth: &Authorized, todo_id: TodoId) -> Result<Todo, ServiceError> {
        self.load(auth, todo_id, Action::Read).await
    }

    pub async fn create(
        &self,
        auth: &Authorized,
        title: &str,
        completed: Option<bool>,
    ) -> Result<Todo, ServiceError> {
        let new_todo = NewTodo {
            owner_id: auth.identity.id,
            title: clean_title(title)?,
            completed: completed.unwrap_or(false),
        };
        auth.require(Action::Create, &new_todo)?;

        let todo = self.todos.insert_todo(new_todo, self.clock.now()).await?;
        tracing::info!(user_id = %auth.identity.id, todo_id = %todo.todo_id, "Todo created");
        Ok(todo)
    }

    pub async fn update(
        &self,
        auth: &Authorized,
        todo_id: TodoId,
        mut changes: TodoChanges,
    ) -> Result<Todo, ServiceError> {
        self.load(auth, todo_id, Action::Update).await?;

        if let Some(title) = changes.title.as_deref() {
            changes.title = Some(clean_title(title)?);
        }

        self.todos
            .update_todo(todo_id, changes, self.clock.now())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Todo".to_string()))
    }

    pub async fn delete(&self, auth: &Authorized, todo_id: TodoId) -> Result<(), ServiceError> {
        self.load(auth, todo_id, Action::Delete).await?;

        if !self.todos.delete_todo(todo_id).await? {
            return Err(ServiceError::NotFound("Todo".to_string()));
        }
        tracing::info!(user_id = %auth.identity.id, todo_id = %todo_id, "Todo deleted");
        Ok(())
    }
}
