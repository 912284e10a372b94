//! Liveness route, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `"ok"` when the database answers and the annotation tables exist,
    /// `"degraded"` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Migrations have created the section, bubble and comment tables.
    pub schema_ready: bool,
}

impl HealthReport {
    fn new(tables: Result<bool, sqlx::Error>) -> Self {
        let db_healthy = tables.is_ok();
        let schema_ready = tables.unwrap_or(false);
        Self {
            status: if schema_ready { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            schema_ready,
        }
    }
}

/// GET /health
///
/// Always 200; the body carries the verdict.
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let tables = bubblemachine_db::annotation_tables_present(&state.pool).await;
    if let Err(err) = &tables {
        tracing::warn!(error = %err, "Health check could not reach the database");
    }
    Json(HealthReport::new(tables))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
