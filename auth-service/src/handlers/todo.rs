use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::todo::{CreateTodoRequest, UpdateTodoRequest},
    middleware::Credentials,
    models::{Todo, TodoId},
    services::Operation,
    utils::ValidatedJson,
    AppState,
};

/// List the caller's todos
#[utoipa::path(
    get,
    path = "/todos",
    responses(
        (status = 200, description = "Todos, newest first", body = Vec<Todo>),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::dtos::ErrorResponse)
    ),
    tag = "Todos",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn list_todos(
    State(state): State<AppState>,
    credentials: Credentials,
) -> Result<Json<Vec<Todo>>, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::ListTodos)?;
    Ok(Json(state.todo_service.list(&auth).await?))
}

/// Create a todo owned by the caller
#[utoipa::path(
    post,
    path = "/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = Todo),
        (status = 400, description = "Validation error", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::dtos::ErrorResponse)
    ),
    tag = "Todos",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn create_todo(
    State(state): State<AppState>,
    credentials: Credentials,
    ValidatedJson(req): ValidatedJson<CreateTodoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::CreateTodo)?;
    let todo = state
        .todo_service
        .create(&auth, &req.title, req.completed)
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Fetch one todo
#[utoipa::path(
    get,
    path = "/todos/{todo_id}",
    params(("todo_id" = i64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Todo", body = Todo),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 403, description = "Owned by another user", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Todo not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Todos",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn get_todo(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(todo_id): Path<TodoId>,
) -> Result<Json<Todo>, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::ReadTodo)?;
    Ok(Json(state.todo_service.get(&auth, todo_id).await?))
}

/// Update title and/or completion
#[utoipa::path(
    put,
    path = "/todos/{todo_id}",
    params(("todo_id" = i64, Path, description = "Todo id")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Updated todo", body = Todo),
        (status = 400, description = "Validation error", body = crate::dtos::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 403, description = "Owned by another user", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Todo not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Todos",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn update_todo(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(todo_id): Path<TodoId>,
    ValidatedJson(req): ValidatedJson<UpdateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::UpdateTodo)?;
    let todo = state
        .todo_service
        .update(&auth, todo_id, req.into())
        .await?;
    Ok(Json(todo))
}

/// Delete a todo
#[utoipa::path(
    delete,
    path = "/todos/{todo_id}",
    params(("todo_id" = i64, Path, description = "Todo id")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 401, description = "Not authenticated", body = crate::dtos::ErrorResponse),
        (status = 403, description = "Owned by another user", body = crate::dtos::ErrorResponse),
        (status = 404, description = "Todo not found", body = crate::dtos::ErrorResponse)
    ),
    tag = "Todos",
    security(("cookie_auth" = []), ("bearer_auth" = []))
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    credentials: Credentials,
    Path(todo_id): Path<TodoId>,
) -> Result<StatusCode, AppError> {
    let auth = state
        .gate
        .authorize(credentials.access_token(), Operation::DeleteTodo)?;
    state.todo_service.delete(&auth, todo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
