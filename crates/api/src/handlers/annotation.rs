//! Handlers for single annotations within a section.
//!
//! `{kind}` in the path is the collection name (`bubbles` / `comments`) and
//! `{annotation_id}` is the client-chosen id, the same `id` the wire shapes
//! carry. Each write locks the section, checks the item against the ids
//! already stored there, and commits in one transaction.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use bubblemachine_core::annotation::{AnnotationKind, WireAnnotation};
use bubblemachine_core::error::CoreError;
use bubblemachine_core::reconcile::AnnotationStore;
use bubblemachine_core::types::DbId;
use bubblemachine_core::validation::{
    existing_keys, AnnotationErrors, AnnotationValidator, PayloadErrors,
};
use bubblemachine_db::repositories::{AnnotationRepo, SectionRepo};
use bubblemachine_db::PgAnnotationStore;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::section::{ensure_owned_section, lock_owned_section};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn invalid(kind: AnnotationKind) -> impl FnOnce(AnnotationErrors) -> AppError {
    move |errors| AppError::Core(CoreError::InvalidFields(PayloadErrors::single(kind, errors)))
}

fn annotation_not_found(kind: AnnotationKind, key: &str) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: kind.as_str(),
        key: key.to_string(),
    })
}

/// GET /sections/{id}/{kind}
pub async fn list_annotations(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((section_id, collection)): AppPath<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    let kind = AnnotationKind::from_collection(&collection)?;
    ensure_owned_section(&state.pool, section_id, auth.user_id).await?;

    let records = AnnotationRepo::list_by_section(&state.pool, section_id, kind).await?;
    let data: Vec<WireAnnotation> = records.iter().map(|r| r.annotation.to_wire()).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /sections/{id}/{kind}
///
/// Add one annotation. Its id must not already exist in the section.
pub async fn create_annotation(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((section_id, collection)): AppPath<(DbId, String)>,
    AppJson(item): AppJson<Value>,
) -> AppResult<impl IntoResponse> {
    let kind = AnnotationKind::from_collection(&collection)?;
    let validator = AnnotationValidator::new(kind);

    let mut store = PgAnnotationStore::begin(&state.pool).await?;
    lock_owned_section(&mut store, section_id, auth.user_id).await?;

    let existing = store.load_annotations(section_id, kind).await?;
    let annotation = validator
        .validate_one(&item, &existing_keys(&existing), None)
        .map_err(invalid(kind))?;

    let stored = store.create_annotation(section_id, &annotation).await?;
    SectionRepo::touch(store.connection(), section_id).await?;
    store.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        section_id,
        kind = kind.as_str(),
        external_id = %stored.external_id(),
        "Annotation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: stored.annotation.to_wire(),
        }),
    ))
}

/// PUT /sections/{id}/{kind}/{annotation_id}
///
/// Overwrite one annotation. The body may rename it, provided the new id is
/// not held by another annotation in the section.
pub async fn update_annotation(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((section_id, collection, annotation_id)): AppPath<(DbId, String, String)>,
    AppJson(item): AppJson<Value>,
) -> AppResult<impl IntoResponse> {
    let kind = AnnotationKind::from_collection(&collection)?;
    let validator = AnnotationValidator::new(kind);

    let mut store = PgAnnotationStore::begin(&state.pool).await?;
    lock_owned_section(&mut store, section_id, auth.user_id).await?;

    let existing = store.load_annotations(section_id, kind).await?;
    let handle = existing
        .iter()
        .find(|r| r.external_id() == annotation_id)
        .map(|r| r.handle())
        .ok_or_else(|| annotation_not_found(kind, &annotation_id))?;

    let annotation = validator
        .validate_one(&item, &existing_keys(&existing), Some(handle.id))
        .map_err(invalid(kind))?;

    let stored = store.update_annotation(handle, &annotation).await?;
    SectionRepo::touch(store.connection(), section_id).await?;
    store.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        section_id,
        kind = kind.as_str(),
        external_id = %annotation_id,
        new_external_id = %stored.external_id(),
        "Annotation updated"
    );

    Ok(Json(DataResponse {
        data: stored.annotation.to_wire(),
    }))
}

/// DELETE /sections/{id}/{kind}/{annotation_id}
pub async fn delete_annotation(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((section_id, collection, annotation_id)): AppPath<(DbId, String, String)>,
) -> AppResult<impl IntoResponse> {
    let kind = AnnotationKind::from_collection(&collection)?;

    let mut store = PgAnnotationStore::begin(&state.pool).await?;
    lock_owned_section(&mut store, section_id, auth.user_id).await?;

    let record =
        AnnotationRepo::find_by_external_id(store.connection(), section_id, kind, &annotation_id)
            .await?
            .ok_or_else(|| annotation_not_found(kind, &annotation_id))?;

    store.delete_annotation(record.handle()).await?;
    SectionRepo::touch(store.connection(), section_id).await?;
    store.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        section_id,
        kind = kind.as_str(),
        external_id = %annotation_id,
        "Annotation deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
