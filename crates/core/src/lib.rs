//! Domain logic for bubble sections: time codecs, annotation types,
//! payload validation, and reconciliation against an annotation store.
//!
//! Nothing in this crate performs I/O. Persistence is reached through the
//! [`reconcile::AnnotationStore`] trait.

pub mod annotation;
pub mod error;
#[cfg(test)]
pub(crate) mod memory;
pub mod reconcile;
pub mod time_codec;
pub mod types;
pub mod validation;
