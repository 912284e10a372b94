//! Request handlers.
//!
//! Handlers validate payloads through `bubblemachine_core`, run writes in a
//! [`bubblemachine_db::PgAnnotationStore`] transaction and map errors via
//! [`AppError`](crate::error::AppError).

pub mod annotation;
pub mod section;
