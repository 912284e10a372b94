//! Annotation types: bubbles and comments attached to a bubble section.
//!
//! [`Annotation`] is the validated, kind-specific value the reconciler works
//! with. [`StoredAnnotation`] adds the storage identity. The `*Wire` structs
//! are the exact JSON shapes exchanged with clients.

use serde::Serialize;

use crate::error::CoreError;
use crate::time_codec::{encode_bubble_time, encode_comment_time, TimeOffset};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// The two annotation variants. Each kind is reconciled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Bubble,
    Comment,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 2] = [AnnotationKind::Bubble, AnnotationKind::Comment];

    /// Singular name, used in log fields and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bubble => "bubble",
            Self::Comment => "comment",
        }
    }

    /// Collection name as it appears in section payloads and URL paths.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Bubble => "bubbles",
            Self::Comment => "comments",
        }
    }

    /// Parse a collection name (`"bubbles"` / `"comments"`).
    pub fn from_collection(s: &str) -> Result<Self, CoreError> {
        match s {
            "bubbles" => Ok(Self::Bubble),
            "comments" => Ok(Self::Comment),
            _ => Err(CoreError::Validation(format!(
                "Unknown annotation collection '{s}'. Must be one of: bubbles, comments"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleFields {
    pub layer: String,
    pub name: String,
    pub start_time: TimeOffset,
    pub stop_time: TimeOffset,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentFields {
    pub start_time: TimeOffset,
    pub end_time: TimeOffset,
    pub text: String,
}

/// Kind-specific mutable fields of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationBody {
    Bubble(BubbleFields),
    Comment(CommentFields),
}

impl AnnotationBody {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::Bubble(_) => AnnotationKind::Bubble,
            Self::Comment(_) => AnnotationKind::Comment,
        }
    }
}

/// A validated annotation, identified by its client-chosen external id.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub external_id: String,
    pub body: AnnotationBody,
}

impl Annotation {
    pub fn bubble(external_id: impl Into<String>, fields: BubbleFields) -> Self {
        Self {
            external_id: external_id.into(),
            body: AnnotationBody::Bubble(fields),
        }
    }

    pub fn comment(external_id: impl Into<String>, fields: CommentFields) -> Self {
        Self {
            external_id: external_id.into(),
            body: AnnotationBody::Comment(fields),
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        self.body.kind()
    }

    /// Encode into the client wire shape, re-encoding times per kind.
    pub fn to_wire(&self) -> WireAnnotation {
        match &self.body {
            AnnotationBody::Bubble(b) => WireAnnotation::Bubble(BubbleWire {
                id: self.external_id.clone(),
                layer: b.layer.clone(),
                bubble_name: b.name.clone(),
                start_time: encode_bubble_time(b.start_time),
                stop_time: encode_bubble_time(b.stop_time),
                color: b.color.clone(),
            }),
            AnnotationBody::Comment(c) => WireAnnotation::Comment(CommentWire {
                id: self.external_id.clone(),
                start_time: encode_comment_time(c.start_time),
                end_time: encode_comment_time(c.end_time),
                text: c.text.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Stored records
// ---------------------------------------------------------------------------

/// Storage identity of one annotation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
    pub kind: AnnotationKind,
    pub id: DbId,
}

/// An annotation as persisted under a section.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAnnotation {
    pub id: DbId,
    pub section_id: DbId,
    pub annotation: Annotation,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StoredAnnotation {
    pub fn handle(&self) -> RecordHandle {
        RecordHandle {
            kind: self.annotation.kind(),
            id: self.id,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.annotation.external_id
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// `{id, layer, bubbleName, startTime, stopTime, color}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleWire {
    pub id: String,
    pub layer: String,
    pub bubble_name: String,
    pub start_time: String,
    pub stop_time: String,
    pub color: String,
}

/// `{id, startTime, endTime, text}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWire {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireAnnotation {
    Bubble(BubbleWire),
    Comment(CommentWire),
}
