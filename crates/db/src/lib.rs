//! PostgreSQL persistence for bubble sections and their annotations.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub use store::PgAnnotationStore;

pub type DbPool = sqlx::PgPool;

/// PostgreSQL error code for unique constraint violations.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Whether the section, bubble and comment tables exist. Errors only when the
/// database cannot be reached.
pub async fn annotation_tables_present(pool: &DbPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT to_regclass('bubble_sections') IS NOT NULL \
            AND to_regclass('bubbles') IS NOT NULL \
            AND to_regclass('comments') IS NOT NULL",
    )
    .fetch_one(pool)
    .await
}

/// Apply the embedded migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
