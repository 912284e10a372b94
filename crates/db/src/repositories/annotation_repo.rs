//! Repository for the `bubbles` and `comments` tables.
//!
//! The two tables share a shape (section FK, external id, two time columns)
//! but differ in their payload columns, so each method dispatches on
//! [`AnnotationKind`] and decodes through the matching row model.

use bubblemachine_core::annotation::{
    Annotation, AnnotationBody, AnnotationKind, RecordHandle, StoredAnnotation,
};
use bubblemachine_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::annotation::{BubbleRow, CommentRow};

/// Column list for bubbles queries.
const BUBBLE_COLUMNS: &str = "id, section_id, external_id, layer, bubble_name, \
    start_seconds, stop_seconds, color, created_at, updated_at";

/// Column list for comments queries.
const COMMENT_COLUMNS: &str = "id, section_id, external_id, start_seconds, end_seconds, \
    text, created_at, updated_at";

fn table(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Bubble => "bubbles",
        AnnotationKind::Comment => "comments",
    }
}

fn bubbles(rows: Vec<BubbleRow>) -> Result<Vec<StoredAnnotation>, sqlx::Error> {
    rows.into_iter().map(BubbleRow::into_stored).collect()
}

fn comments(rows: Vec<CommentRow>) -> Result<Vec<StoredAnnotation>, sqlx::Error> {
    rows.into_iter().map(CommentRow::into_stored).collect()
}

/// Provides CRUD operations for section annotations.
pub struct AnnotationRepo;

impl AnnotationRepo {
    /// List one kind of annotation under a section, in creation order.
    pub async fn list_by_section<'e>(
        executor: impl PgExecutor<'e>,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<Vec<StoredAnnotation>, sqlx::Error> {
        match kind {
            AnnotationKind::Bubble => {
                let query = format!(
                    "SELECT {BUBBLE_COLUMNS} FROM bubbles
                     WHERE section_id = $1
                     ORDER BY id ASC"
                );
                let rows = sqlx::query_as::<_, BubbleRow>(&query)
                    .bind(section_id)
                    .fetch_all(executor)
                    .await?;
                bubbles(rows)
            }
            AnnotationKind::Comment => {
                let query = format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments
                     WHERE section_id = $1
                     ORDER BY id ASC"
                );
                let rows = sqlx::query_as::<_, CommentRow>(&query)
                    .bind(section_id)
                    .fetch_all(executor)
                    .await?;
                comments(rows)
            }
        }
    }

    /// List one kind of annotation across several sections, grouped by
    /// section then creation order. Used to render section listings without
    /// a query per section.
    pub async fn list_by_sections<'e>(
        executor: impl PgExecutor<'e>,
        section_ids: &[DbId],
        kind: AnnotationKind,
    ) -> Result<Vec<StoredAnnotation>, sqlx::Error> {
        if section_ids.is_empty() {
            return Ok(Vec::new());
        }

        match kind {
            AnnotationKind::Bubble => {
                let query = format!(
                    "SELECT {BUBBLE_COLUMNS} FROM bubbles
                     WHERE section_id = ANY($1)
                     ORDER BY section_id ASC, id ASC"
                );
                let rows = sqlx::query_as::<_, BubbleRow>(&query)
                    .bind(section_ids)
                    .fetch_all(executor)
                    .await?;
                bubbles(rows)
            }
            AnnotationKind::Comment => {
                let query = format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments
                     WHERE section_id = ANY($1)
                     ORDER BY section_id ASC, id ASC"
                );
                let rows = sqlx::query_as::<_, CommentRow>(&query)
                    .bind(section_ids)
                    .fetch_all(executor)
                    .await?;
                comments(rows)
            }
        }
    }

    /// Find an annotation by its client-chosen id within a section.
    pub async fn find_by_external_id<'e>(
        executor: impl PgExecutor<'e>,
        section_id: DbId,
        kind: AnnotationKind,
        external_id: &str,
    ) -> Result<Option<StoredAnnotation>, sqlx::Error> {
        match kind {
            AnnotationKind::Bubble => {
                let query = format!(
                    "SELECT {BUBBLE_COLUMNS} FROM bubbles
                     WHERE section_id = $1 AND external_id = $2"
                );
                sqlx::query_as::<_, BubbleRow>(&query)
                    .bind(section_id)
                    .bind(external_id)
                    .fetch_optional(executor)
                    .await?
                    .map(BubbleRow::into_stored)
                    .transpose()
            }
            AnnotationKind::Comment => {
                let query = format!(
                    "SELECT {COMMENT_COLUMNS} FROM comments
                     WHERE section_id = $1 AND external_id = $2"
                );
                sqlx::query_as::<_, CommentRow>(&query)
                    .bind(section_id)
                    .bind(external_id)
                    .fetch_optional(executor)
                    .await?
                    .map(CommentRow::into_stored)
                    .transpose()
            }
        }
    }

    /// Insert an annotation under a section, returning the created row.
    ///
    /// Fails with a `23505` database error if the external id is taken.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        section_id: DbId,
        annotation: &Annotation,
    ) -> Result<StoredAnnotation, sqlx::Error> {
        match &annotation.body {
            AnnotationBody::Bubble(b) => {
                let query = format!(
                    "INSERT INTO bubbles
                        (section_id, external_id, layer, bubble_name,
                         start_seconds, stop_seconds, color)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     RETURNING {BUBBLE_COLUMNS}"
                );
                sqlx::query_as::<_, BubbleRow>(&query)
                    .bind(section_id)
                    .bind(&annotation.external_id)
                    .bind(&b.layer)
                    .bind(&b.name)
                    .bind(b.start_time.as_secs())
                    .bind(b.stop_time.as_secs())
                    .bind(&b.color)
                    .fetch_one(executor)
                    .await?
                    .into_stored()
            }
            AnnotationBody::Comment(c) => {
                let query = format!(
                    "INSERT INTO comments
                        (section_id, external_id, start_seconds, end_seconds, text)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING {COMMENT_COLUMNS}"
                );
                sqlx::query_as::<_, CommentRow>(&query)
                    .bind(section_id)
                    .bind(&annotation.external_id)
                    .bind(c.start_time.as_secs())
                    .bind(c.end_time.as_secs())
                    .bind(&c.text)
                    .fetch_one(executor)
                    .await?
                    .into_stored()
            }
        }
    }

    /// Overwrite every field of an existing row, including its external id.
    ///
    /// Returns `None` if no row of the handle's kind has that id. The caller
    /// guarantees `annotation` matches `handle.kind`; a mismatch also yields
    /// `None` since the lookup runs against the handle's table.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        handle: RecordHandle,
        annotation: &Annotation,
    ) -> Result<Option<StoredAnnotation>, sqlx::Error> {
        match (&annotation.body, handle.kind) {
            (AnnotationBody::Bubble(b), AnnotationKind::Bubble) => {
                let query = format!(
                    "UPDATE bubbles SET
                        external_id = $2,
                        layer = $3,
                        bubble_name = $4,
                        start_seconds = $5,
                        stop_seconds = $6,
                        color = $7
                     WHERE id = $1
                     RETURNING {BUBBLE_COLUMNS}"
                );
                sqlx::query_as::<_, BubbleRow>(&query)
                    .bind(handle.id)
                    .bind(&annotation.external_id)
                    .bind(&b.layer)
                    .bind(&b.name)
                    .bind(b.start_time.as_secs())
                    .bind(b.stop_time.as_secs())
                    .bind(&b.color)
                    .fetch_optional(executor)
                    .await?
                    .map(BubbleRow::into_stored)
                    .transpose()
            }
            (AnnotationBody::Comment(c), AnnotationKind::Comment) => {
                let query = format!(
                    "UPDATE comments SET
                        external_id = $2,
                        start_seconds = $3,
                        end_seconds = $4,
                        text = $5
                     WHERE id = $1
                     RETURNING {COMMENT_COLUMNS}"
                );
                sqlx::query_as::<_, CommentRow>(&query)
                    .bind(handle.id)
                    .bind(&annotation.external_id)
                    .bind(c.start_time.as_secs())
                    .bind(c.end_time.as_secs())
                    .bind(&c.text)
                    .fetch_optional(executor)
                    .await?
                    .map(CommentRow::into_stored)
                    .transpose()
            }
            _ => Ok(None),
        }
    }

    /// Delete one row. Returns true if it existed.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        handle: RecordHandle,
    ) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", table(handle.kind));
        let result = sqlx::query(&query)
            .bind(handle.id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every annotation of one kind under a section.
    pub async fn delete_by_section<'e>(
        executor: impl PgExecutor<'e>,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<u64, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE section_id = $1", table(kind));
        let result = sqlx::query(&query)
            .bind(section_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
