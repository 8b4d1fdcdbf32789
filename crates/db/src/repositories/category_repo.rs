//! Repository for the `categories` table.

use sqlx::PgPool;
use todo_core::category::DEFAULT_CATEGORY_COLOR;
use todo_core::types::{DbId, OwnerId};

use crate::models::category::{Category, CreateCategory, UpdateCategory};

/// Column list for categories queries.
const COLUMNS: &str = "id, owner_id, name, color, description, created_at, updated_at";

/// Provides owner-scoped CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List the owner's categories, ordered by name ascending.
    pub async fn list(pool: &PgPool, owner: OwnerId) -> Result<Vec<Category>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM categories WHERE owner_id = $1 ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, Category>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        owner: OwnerId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await
    }

    /// Whether `id` names a category owned by `owner`.
    pub async fn exists(pool: &PgPool, owner: OwnerId, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND owner_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .fetch_one(pool)
        .await
    }

    /// Create a new category, returning the created row.
    ///
    /// Fails with a unique violation on `uq_categories_owner_name` when the
    /// owner already has a category with that name.
    pub async fn create(
        pool: &PgPool,
        owner: OwnerId,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (owner_id, name, color, description)
             VALUES ($1, $2, COALESCE($3, $4), COALESCE($5, ''))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(owner)
            .bind(input.name.trim())
            .bind(&input.color)
            .bind(DEFAULT_CATEGORY_COLOR)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Update a category by ID, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        owner: OwnerId,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($3, name),
                color = COALESCE($4, color),
                description = COALESCE($5, description)
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(owner)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.color)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category by ID. Todos that referenced it become uncategorized.
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, owner: OwnerId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
