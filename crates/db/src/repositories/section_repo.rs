//! Repository for the `bubble_sections` table.
//!
//! Every lookup is scoped to the owning user; a section belonging to someone
//! else is indistinguishable from one that does not exist.

use bubblemachine_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::section::BubbleSection;

/// Column list for bubble_sections queries.
const COLUMNS: &str = "id, user_id, created_at, updated_at";

/// Provides CRUD operations for bubble sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Create an empty section owned by `user_id`.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<BubbleSection, sqlx::Error> {
        let query = format!(
            "INSERT INTO bubble_sections (user_id) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BubbleSection>(&query)
            .bind(user_id)
            .fetch_one(executor)
            .await
    }

    /// Find a section by id if it belongs to `user_id`.
    pub async fn find_for_user<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<BubbleSection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bubble_sections WHERE id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, BubbleSection>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// Like [`Self::find_for_user`], but takes a row lock held until the
    /// surrounding transaction ends. Concurrent reconciles of the same
    /// section queue behind it.
    pub async fn lock_for_user<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<BubbleSection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bubble_sections WHERE id = $1 AND user_id = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, BubbleSection>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    /// List a user's sections, newest first.
    pub async fn list_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<Vec<BubbleSection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bubble_sections
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, BubbleSection>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Bump `updated_at` after the section's annotations changed.
    pub async fn touch<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<BubbleSection, sqlx::Error> {
        let query = format!(
            "UPDATE bubble_sections SET updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BubbleSection>(&query)
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// Delete a section (cascading to its annotations). Returns true if a
    /// row owned by `user_id` was deleted.
    pub async fn delete_for_user<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bubble_sections WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
