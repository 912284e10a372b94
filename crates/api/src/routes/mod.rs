pub mod health;
pub mod section;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sections                                        list, create
/// /sections/{id}                                   get, reconcile (PUT ?mode=), delete
/// /sections/{id}/{kind}                            list, create one annotation
/// /sections/{id}/{kind}/{annotation_id}            update, delete one annotation
/// ```
///
/// `{kind}` is `bubbles` or `comments`; `{annotation_id}` is the client-chosen id.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sections", section::router())
}
