//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods accept any Postgres executor, so the same call works against the
//! pool or inside a transaction.

pub mod annotation_repo;
pub mod section_repo;

pub use annotation_repo::AnnotationRepo;
pub use section_repo::SectionRepo;
