//! Handlers for bubble sections.
//!
//! A section is read and written as a whole: `{ "bubbles": [...],
//! "comments": [...] }`. Writes validate the full payload first, then
//! reconcile it against the stored annotations inside one transaction.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use bubblemachine_core::annotation::{AnnotationKind, StoredAnnotation, WireAnnotation};
use bubblemachine_core::error::CoreError;
use bubblemachine_core::reconcile::{Reconcile, SectionSummary};
use bubblemachine_core::types::{DbId, Timestamp};
use bubblemachine_core::validation::{validate_section, SectionPayload};
use bubblemachine_db::models::section::BubbleSection;
use bubblemachine_db::repositories::{AnnotationRepo, SectionRepo};
use bubblemachine_db::{DbPool, PgAnnotationStore};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const SECTION_ENTITY: &str = "BubbleSection";

/* --------------------------------------------------------------------------
   Views
   -------------------------------------------------------------------------- */

/// A section with its annotations in wire form.
#[derive(Debug, Serialize)]
pub struct SectionView {
    pub id: DbId,
    pub bubbles: Vec<WireAnnotation>,
    pub comments: Vec<WireAnnotation>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Write counts, present on responses to writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SectionSummary>,
}

impl SectionView {
    fn new(
        section: BubbleSection,
        bubbles: Vec<WireAnnotation>,
        comments: Vec<WireAnnotation>,
    ) -> Self {
        Self {
            id: section.id,
            bubbles,
            comments,
            created_at: section.created_at,
            updated_at: section.updated_at,
            summary: None,
        }
    }
}

/// Query parameters for `PUT /sections/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileParams {
    #[serde(default)]
    pub mode: Reconcile,
}

fn to_wire(records: Vec<StoredAnnotation>) -> Vec<WireAnnotation> {
    records.iter().map(|r| r.annotation.to_wire()).collect()
}

/* --------------------------------------------------------------------------
   Helpers
   -------------------------------------------------------------------------- */

fn section_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: SECTION_ENTITY,
        id,
    })
}

/// Load a section owned by `user_id`, or 404.
pub(crate) async fn ensure_owned_section(
    pool: &DbPool,
    section_id: DbId,
    user_id: DbId,
) -> AppResult<BubbleSection> {
    SectionRepo::find_for_user(pool, section_id, user_id)
        .await?
        .ok_or_else(|| section_not_found(section_id))
}

/// Lock a section owned by `user_id` inside the store's transaction, or 404.
///
/// Holding the row lock serializes concurrent writes to the same section.
pub(crate) async fn lock_owned_section(
    store: &mut PgAnnotationStore,
    section_id: DbId,
    user_id: DbId,
) -> AppResult<BubbleSection> {
    SectionRepo::lock_for_user(store.connection(), section_id, user_id)
        .await?
        .ok_or_else(|| section_not_found(section_id))
}

/// Render one section with both annotation collections.
async fn section_view(pool: &DbPool, section: BubbleSection) -> AppResult<SectionView> {
    let bubbles = AnnotationRepo::list_by_section(pool, section.id, AnnotationKind::Bubble).await?;
    let comments =
        AnnotationRepo::list_by_section(pool, section.id, AnnotationKind::Comment).await?;
    Ok(SectionView::new(section, to_wire(bubbles), to_wire(comments)))
}

/// Group records by section id, preserving their order.
fn group_by_section(records: Vec<StoredAnnotation>) -> HashMap<DbId, Vec<WireAnnotation>> {
    let mut grouped: HashMap<DbId, Vec<WireAnnotation>> = HashMap::new();
    for record in records {
        grouped
            .entry(record.section_id)
            .or_default()
            .push(record.annotation.to_wire());
    }
    grouped
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// GET /sections
///
/// List the caller's sections, newest first, with their annotations.
pub async fn list_sections(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let sections = SectionRepo::list_for_user(&state.pool, auth.user_id).await?;
    let ids: Vec<DbId> = sections.iter().map(|s| s.id).collect();

    let mut bubbles = group_by_section(
        AnnotationRepo::list_by_sections(&state.pool, &ids, AnnotationKind::Bubble).await?,
    );
    let mut comments = group_by_section(
        AnnotationRepo::list_by_sections(&state.pool, &ids, AnnotationKind::Comment).await?,
    );

    let views: Vec<SectionView> = sections
        .into_iter()
        .map(|s| {
            let b = bubbles.remove(&s.id).unwrap_or_default();
            let c = comments.remove(&s.id).unwrap_or_default();
            SectionView::new(s, b, c)
        })
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/// POST /sections
///
/// Create a section, optionally seeded with bubbles and comments.
pub async fn create_section(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SectionPayload>,
) -> AppResult<impl IntoResponse> {
    let batch = validate_section(&payload).map_err(CoreError::InvalidFields)?;

    let mut store = PgAnnotationStore::begin(&state.pool).await?;
    let section = SectionRepo::create(store.connection(), auth.user_id).await?;
    let summary = Reconcile::Update.apply(&mut store, section.id, batch).await?;
    store.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        section_id = section.id,
        bubbles = summary.bubbles.created,
        comments = summary.comments.created,
        "Bubble section created"
    );

    let mut view = section_view(&state.pool, section).await?;
    view.summary = Some(summary);
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /sections/{id}
pub async fn get_section(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(section_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let section = ensure_owned_section(&state.pool, section_id, auth.user_id).await?;
    let view = section_view(&state.pool, section).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /sections/{id}?mode=update|replace
///
/// Reconcile the stored annotations against the payload. In `update` mode
/// (the default) only the collections present in the body are touched and
/// matched records keep their identity; `replace` clears both collections
/// and inserts the body fresh.
pub async fn update_section(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(section_id): AppPath<DbId>,
    AppQuery(params): AppQuery<ReconcileParams>,
    AppJson(payload): AppJson<SectionPayload>,
) -> AppResult<impl IntoResponse> {
    let batch = validate_section(&payload).map_err(CoreError::InvalidFields)?;

    let mut store = PgAnnotationStore::begin(&state.pool).await?;
    lock_owned_section(&mut store, section_id, auth.user_id).await?;
    let summary = params.mode.apply(&mut store, section_id, batch).await?;
    let section = SectionRepo::touch(store.connection(), section_id).await?;
    store.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        section_id,
        mode = params.mode.as_str(),
        bubbles_created = summary.bubbles.created,
        bubbles_updated = summary.bubbles.updated,
        bubbles_deleted = summary.bubbles.deleted,
        comments_created = summary.comments.created,
        comments_updated = summary.comments.updated,
        comments_deleted = summary.comments.deleted,
        "Bubble section reconciled"
    );

    let mut view = section_view(&state.pool, section).await?;
    view.summary = Some(summary);
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /sections/{id}
///
/// Delete a section and, by cascade, all of its annotations.
pub async fn delete_section(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(section_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = SectionRepo::delete_for_user(&state.pool, section_id, auth.user_id).await?;
    if !deleted {
        return Err(section_not_found(section_id));
    }

    tracing::info!(user_id = auth.user_id, section_id, "Bubble section deleted");

    Ok(StatusCode::NO_CONTENT)
}
