//! Route definitions for bubble sections and their annotations.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{annotation, section};
use crate::state::AppState;

/// Section routes, nested under `/sections`.
///
/// ```text
/// GET    /                                  list_sections
/// POST   /                                  create_section
/// GET    /{id}                              get_section
/// PUT    /{id}                              update_section (?mode=update|replace)
/// DELETE /{id}                              delete_section
/// GET    /{id}/{kind}                       list_annotations
/// POST   /{id}/{kind}                       create_annotation
/// PUT    /{id}/{kind}/{annotation_id}       update_annotation
/// DELETE /{id}/{kind}/{annotation_id}       delete_annotation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(section::list_sections).post(section::create_section))
        .route(
            "/{id}",
            get(section::get_section)
                .put(section::update_section)
                .delete(section::delete_section),
        )
        .route(
            "/{id}/{kind}",
            get(annotation::list_annotations).post(annotation::create_annotation),
        )
        .route(
            "/{id}/{kind}/{annotation_id}",
            put(annotation::update_annotation).delete(annotation::delete_annotation),
        )
}
