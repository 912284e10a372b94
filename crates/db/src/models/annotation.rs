//! Bubble and comment row models.

use bubblemachine_core::annotation::{Annotation, BubbleFields, CommentFields, StoredAnnotation};
use bubblemachine_core::time_codec::TimeOffset;
use bubblemachine_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `bubbles` table.
#[derive(Debug, Clone, FromRow)]
pub struct BubbleRow {
    pub id: DbId,
    pub section_id: DbId,
    pub external_id: String,
    pub layer: String,
    pub bubble_name: String,
    pub start_seconds: f64,
    pub stop_seconds: f64,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: DbId,
    pub section_id: DbId,
    pub external_id: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Decode a stored seconds column. The table CHECKs make failure unlikely,
/// but NaN can still slip through a DOUBLE PRECISION column.
fn offset(secs: f64) -> Result<TimeOffset, sqlx::Error> {
    TimeOffset::from_secs(secs).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl BubbleRow {
    pub fn into_stored(self) -> Result<StoredAnnotation, sqlx::Error> {
        Ok(StoredAnnotation {
            id: self.id,
            section_id: self.section_id,
            annotation: Annotation::bubble(
                self.external_id,
                BubbleFields {
                    layer: self.layer,
                    name: self.bubble_name,
                    start_time: offset(self.start_seconds)?,
                    stop_time: offset(self.stop_seconds)?,
                    color: self.color,
                },
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CommentRow {
    pub fn into_stored(self) -> Result<StoredAnnotation, sqlx::Error> {
        Ok(StoredAnnotation {
            id: self.id,
            section_id: self.section_id,
            annotation: Annotation::comment(
                self.external_id,
                CommentFields {
                    start_time: offset(self.start_seconds)?,
                    end_time: offset(self.end_seconds)?,
                    text: self.text,
                },
            ),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
