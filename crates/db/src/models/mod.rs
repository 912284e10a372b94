//! Row structs for the section and annotation tables.
//!
//! Annotation rows convert into `bubblemachine_core::annotation::StoredAnnotation`
//! so the rest of the system never sees raw columns.

pub mod annotation;
pub mod section;
