use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::TodoChanges;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, max = 500))]
    #[schema(example = "Buy milk")]
    pub title: String,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for TodoChanges {
    fn from(req: UpdateTodoRequest) -> Self {
        Self {
            title: req.title,
            completed: req.completed,
        }
    }
}
