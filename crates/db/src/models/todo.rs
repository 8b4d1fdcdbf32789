//! Todo entity row and DTOs.

use serde::Deserialize;
use sqlx::FromRow;
use todo_core::todo::{validate_title, Priority, Todo};
use todo_core::types::{DbId, OwnerId, Timestamp};
use validator::{Validate, ValidationError};

use super::{nullable, validation_error};

/// A row from the `todos` table.
///
/// Converted into the domain [`Todo`] right after fetching.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub category_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            priority: row.priority,
            category_id: row.category_id,
            due_date: row.due_date,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// DTO for creating a new todo. The owner comes from the caller's identity.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodo {
    #[validate(custom(function = "check_title"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub category_id: Option<DbId>,
    pub due_date: Option<Timestamp>,
}

/// DTO for updating a todo.
///
/// Absent fields are left unchanged. `category_id` and `due_date` accept an
/// explicit `null` to clear the value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTodo {
    #[validate(custom(function = "check_title"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<Timestamp>>,
    pub completed: Option<bool>,
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    validate_title(title).map_err(|msg| validation_error("title", msg))
}
