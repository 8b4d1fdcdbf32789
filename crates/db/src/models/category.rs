//! Category entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use todo_core::category::{is_valid_hex_color, validate_category_name};
use todo_core::types::{DbId, OwnerId, Timestamp};
use validator::{Validate, ValidationError};

use super::validation_error;

/// A row from the `categories` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: DbId,
    pub owner_id: OwnerId,
    pub name: String,
    pub color: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new category.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(custom(function = "check_name"))]
    pub name: String,
    #[validate(custom(function = "check_color"))]
    pub color: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating a category. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(custom(function = "check_name"))]
    pub name: Option<String>,
    #[validate(custom(function = "check_color"))]
    pub color: Option<String>,
    pub description: Option<String>,
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    validate_category_name(name).map_err(|msg| validation_error("name", msg))
}

fn check_color(color: &str) -> Result<(), ValidationError> {
    if is_valid_hex_color(color) {
        Ok(())
    } else {
        Err(validation_error(
            "color",
            format!("Color must be a #RRGGBB hex string, got '{color}'"),
        ))
    }
}
