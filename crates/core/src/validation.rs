//! Validation of client annotation payloads.
//!
//! Payload items arrive as raw JSON maps. The validator checks every item and
//! reports *all* problems at once, keyed by item index and wire field name, so
//! a client can highlight each offending field. Duplicate ids within a batch
//! produce one batch-level error regardless of per-item failures.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::ValidateLength;

use crate::annotation::{Annotation, AnnotationKind, BubbleFields, CommentFields, StoredAnnotation};
use crate::reconcile::SectionBatch;
use crate::time_codec::{decode_bubble_time, decode_comment_time, TimeFormatError, TimeOffset};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a client-chosen annotation id.
pub const MAX_EXTERNAL_ID_LENGTH: u64 = 50;

/// Maximum length of a bubble layer label.
pub const MAX_LAYER_LENGTH: u64 = 10;

/// Maximum length of a bubble name.
pub const MAX_BUBBLE_NAME_LENGTH: u64 = 100;

/// Maximum length of a bubble color token (e.g. `#98DDCA`).
pub const MAX_COLOR_LENGTH: u64 = 7;

/// Field key used for errors that concern the whole item rather than a field.
pub const ITEM_FIELD: &str = "item";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldErrorKind {
    MissingField,
    Format,
    TooLong,
    DuplicateId,
    NotUnique,
    InvalidItem,
}

/// One problem with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Errors for one payload item, keyed by wire field name.
pub type ItemErrors = BTreeMap<&'static str, Vec<FieldError>>;

/// Errors for one annotation collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationErrors {
    /// Batch-level errors (duplicate ids).
    #[serde(rename = "non_field_errors", skip_serializing_if = "Vec::is_empty")]
    pub batch: Vec<FieldError>,
    /// Per-item errors, keyed by the item's index in the submitted batch.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub items: BTreeMap<usize, ItemErrors>,
}

impl AnnotationErrors {
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty() && self.items.is_empty()
    }

    /// Total number of individual errors.
    pub fn error_count(&self) -> usize {
        self.batch.len()
            + self
                .items
                .values()
                .flat_map(|fields| fields.values())
                .map(Vec::len)
                .sum::<usize>()
    }

    /// Errors recorded for `field` of the item at `index`.
    pub fn field(&self, index: usize, field: &str) -> &[FieldError] {
        self.items
            .get(&index)
            .and_then(|fields| fields.get(field))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Errors for a whole section payload, keyed by collection name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PayloadErrors(BTreeMap<&'static str, AnnotationErrors>);

impl PayloadErrors {
    /// Errors concerning a single collection.
    pub fn single(kind: AnnotationKind, errors: AnnotationErrors) -> Self {
        let mut payload = Self::default();
        payload.insert(kind, errors);
        payload
    }

    pub fn insert(&mut self, kind: AnnotationKind, errors: AnnotationErrors) {
        if !errors.is_empty() {
            self.0.insert(kind.collection(), errors);
        }
    }

    pub fn get(&self, kind: AnnotationKind) -> Option<&AnnotationErrors> {
        self.0.get(kind.collection())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.0.values().map(AnnotationErrors::error_count).sum()
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Raw section body: `{ "bubbles": [...], "comments": [...] }`.
///
/// A collection that is absent is left untouched by an update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionPayload {
    #[serde(default)]
    pub bubbles: Option<Vec<Value>>,
    #[serde(default)]
    pub comments: Option<Vec<Value>>,
}

impl SectionPayload {
    pub fn items(&self, kind: AnnotationKind) -> Option<&[Value]> {
        match kind {
            AnnotationKind::Bubble => self.bubbles.as_deref(),
            AnnotationKind::Comment => self.comments.as_deref(),
        }
    }
}

/// External ids already stored under one section and kind, mapped to the
/// record id holding them.
pub type ExistingKeys = HashMap<String, DbId>;

/// Build the [`ExistingKeys`] index for a loaded set of records.
pub fn existing_keys(records: &[StoredAnnotation]) -> ExistingKeys {
    records
        .iter()
        .map(|r| (r.annotation.external_id.clone(), r.id))
        .collect()
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Validates payload items of one annotation kind.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationValidator {
    kind: AnnotationKind,
}

impl AnnotationValidator {
    pub fn new(kind: AnnotationKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Validate a whole batch destined for one section.
    ///
    /// Returns the validated annotations in submission order, or every error
    /// found: per-item field errors plus a single duplicate-id error when any
    /// id appears more than once.
    pub fn validate_batch(&self, items: &[Value]) -> Result<Vec<Annotation>, AnnotationErrors> {
        let mut errors = AnnotationErrors::default();
        let mut validated = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            match self.validate_item(item) {
                Ok(annotation) => validated.push(annotation),
                Err(item_errors) => {
                    errors.items.insert(index, item_errors);
                }
            }
        }

        if has_duplicate_ids(items) {
            errors.batch.push(FieldError::new(
                FieldErrorKind::DuplicateId,
                format!("Duplicate {} IDs are not allowed", self.kind.as_str()),
            ));
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }

    /// Validate a single item against the ids already stored in its section.
    ///
    /// `updating` is the record the item will overwrite, if any; its own id
    /// is not a conflict. Errors are reported under item index `0`.
    pub fn validate_one(
        &self,
        item: &Value,
        existing: &ExistingKeys,
        updating: Option<DbId>,
    ) -> Result<Annotation, AnnotationErrors> {
        let result = self.validate_item(item);

        let conflict = raw_id(item)
            .and_then(|id| existing.get(&id).copied())
            .filter(|&holder| Some(holder) != updating);

        match (result, conflict) {
            (Ok(annotation), None) => Ok(annotation),
            (result, conflict) => {
                let mut item_errors = result.err().unwrap_or_default();
                if conflict.is_some() {
                    item_errors.entry("id").or_default().push(FieldError::new(
                        FieldErrorKind::NotUnique,
                        format!(
                            "A {} with this id already exists in this section",
                            self.kind.as_str()
                        ),
                    ));
                }
                Err(AnnotationErrors {
                    batch: Vec::new(),
                    items: BTreeMap::from([(0, item_errors)]),
                })
            }
        }
    }

    fn validate_item(&self, item: &Value) -> Result<Annotation, ItemErrors> {
        let Some(obj) = item.as_object() else {
            return Err(BTreeMap::from([(
                ITEM_FIELD,
                vec![FieldError::new(
                    FieldErrorKind::InvalidItem,
                    format!("Expected a {} object", self.kind.as_str()),
                )],
            )]));
        };

        let mut errors = ItemErrors::new();
        let external_id = required_string(obj, "id", Some(MAX_EXTERNAL_ID_LENGTH), &mut errors);

        let annotation = match self.kind {
            AnnotationKind::Bubble => {
                let layer = required_string(obj, "layer", Some(MAX_LAYER_LENGTH), &mut errors);
                let name =
                    required_string(obj, "bubbleName", Some(MAX_BUBBLE_NAME_LENGTH), &mut errors);
                let start_time = required_time(obj, "startTime", bubble_time, &mut errors);
                let stop_time = required_time(obj, "stopTime", bubble_time, &mut errors);
                let color = required_string(obj, "color", Some(MAX_COLOR_LENGTH), &mut errors);

                match (external_id, layer, name, start_time, stop_time, color) {
                    (Some(id), Some(layer), Some(name), Some(start_time), Some(stop_time), Some(color)) => {
                        Some(Annotation::bubble(
                            id,
                            BubbleFields {
                                layer,
                                name,
                                start_time,
                                stop_time,
                                color,
                            },
                        ))
                    }
                    _ => None,
                }
            }
            AnnotationKind::Comment => {
                let start_time = required_time(obj, "startTime", decode_comment_time, &mut errors);
                let end_time = required_time(obj, "endTime", decode_comment_time, &mut errors);
                let text = required_string(obj, "text", None, &mut errors);

                match (external_id, start_time, end_time, text) {
                    (Some(id), Some(start_time), Some(end_time), Some(text)) => {
                        Some(Annotation::comment(
                            id,
                            CommentFields {
                                start_time,
                                end_time,
                                text,
                            },
                        ))
                    }
                    _ => None,
                }
            }
        };

        match annotation {
            Some(annotation) if errors.is_empty() => Ok(annotation),
            _ => Err(errors),
        }
    }
}

/// Validate every collection present in a section payload.
pub fn validate_section(payload: &SectionPayload) -> Result<SectionBatch, PayloadErrors> {
    let mut errors = PayloadErrors::default();
    let mut batch = SectionBatch::default();

    for kind in AnnotationKind::ALL {
        let Some(items) = payload.items(kind) else {
            continue;
        };
        match AnnotationValidator::new(kind).validate_batch(items) {
            Ok(annotations) => batch.set(kind, annotations),
            Err(kind_errors) => errors.insert(kind, kind_errors),
        }
    }

    if errors.is_empty() {
        Ok(batch)
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn push(errors: &mut ItemErrors, field: &'static str, kind: FieldErrorKind, message: impl Into<String>) {
    errors
        .entry(field)
        .or_default()
        .push(FieldError::new(kind, message));
}

/// Coerce a wire value to a trimmed string. Numbers are accepted as text.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn raw_id(item: &Value) -> Option<String> {
    item.get("id")
        .and_then(as_text)
        .filter(|id| !id.is_empty())
}

fn has_duplicate_ids(items: &[Value]) -> bool {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(raw_id)
        .any(|id| !seen.insert(id))
}

fn required_string(
    obj: &Map<String, Value>,
    field: &'static str,
    max_length: Option<u64>,
    errors: &mut ItemErrors,
) -> Option<String> {
    let value = match obj.get(field) {
        None | Some(Value::Null) => {
            push(errors, field, FieldErrorKind::MissingField, "This field is required");
            return None;
        }
        Some(value) => value,
    };

    let Some(text) = as_text(value) else {
        push(errors, field, FieldErrorKind::Format, "Not a valid string");
        return None;
    };

    if text.is_empty() {
        push(errors, field, FieldErrorKind::MissingField, "This field may not be blank");
        return None;
    }

    if let Some(max) = max_length {
        if !text.validate_length(None, Some(max), None) {
            push(
                errors,
                field,
                FieldErrorKind::TooLong,
                format!("Ensure this field has no more than {max} characters"),
            );
            return None;
        }
    }

    Some(text)
}

fn bubble_time(value: &Value) -> Result<TimeOffset, TimeFormatError> {
    match value {
        Value::String(s) => decode_bubble_time(s),
        other => Err(TimeFormatError::BubbleTime(other.to_string())),
    }
}

fn required_time(
    obj: &Map<String, Value>,
    field: &'static str,
    decode: fn(&Value) -> Result<TimeOffset, TimeFormatError>,
    errors: &mut ItemErrors,
) -> Option<TimeOffset> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            push(errors, field, FieldErrorKind::MissingField, "This field is required");
            None
        }
        Some(value) => match decode(value) {
            Ok(offset) => Some(offset),
            Err(e) => {
                push(errors, field, FieldErrorKind::Format, e.to_string());
                None
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn bubble(id: &str) -> Value {
        json!({
            "id": id,
            "layer": "1",
            "bubbleName": "Bubble",
            "startTime": "00:05:000",
            "stopTime": "00:10:000",
            "color": "#FFFFFF"
        })
    }

    fn comment(id: &str) -> Value {
        json!({"id": id, "startTime": 5.0, "endTime": 10.0, "text": "Test comment"})
    }

    fn kinds(errors: &[FieldError]) -> Vec<FieldErrorKind> {
        errors.iter().map(|e| e.kind).collect()
    }

    // -- batch: happy path -------------------------------------------------

    #[test]
    fn valid_bubble_batch_decodes_fields() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let out = validator.validate_batch(&[bubble("a"), bubble("b")]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].external_id, "a");
        assert_matches!(&out[0].body, crate::annotation::AnnotationBody::Bubble(b) => {
            assert_eq!(b.name, "Bubble");
            assert_eq!(b.start_time.as_secs(), 5.0);
            assert_eq!(b.stop_time.as_secs(), 10.0);
        });
    }

    #[test]
    fn valid_comment_batch_accepts_numeric_strings() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let item = json!({"id": "c", "startTime": "1.5", "endTime": 2, "text": "hi"});
        let out = validator.validate_batch(&[item]).unwrap();
        assert_matches!(&out[0].body, crate::annotation::AnnotationBody::Comment(c) => {
            assert_eq!(c.start_time.as_secs(), 1.5);
            assert_eq!(c.end_time.as_secs(), 2.0);
        });
    }

    #[test]
    fn empty_batch_is_valid() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        assert!(validator.validate_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn numeric_id_is_accepted_as_text() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let item = json!({"id": 7, "startTime": 1.0, "endTime": 2.0, "text": "x"});
        let out = validator.validate_batch(&[item]).unwrap();
        assert_eq!(out[0].external_id, "7");
    }

    #[test]
    fn start_after_end_is_permitted() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let item = json!({"id": "c", "startTime": 9.0, "endTime": 1.0, "text": "x"});
        assert!(validator.validate_batch(&[item]).is_ok());
    }

    // -- batch: item errors ------------------------------------------------

    #[test]
    fn missing_id_reported_on_id_field() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let mut item = bubble("x");
        item.as_object_mut().unwrap().remove("id");
        let errors = validator.validate_batch(&[item]).unwrap_err();
        assert_eq!(kinds(errors.field(0, "id")), vec![FieldErrorKind::MissingField]);
    }

    #[test]
    fn blank_id_reported_on_id_field() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let errors = validator.validate_batch(&[comment("  ")]).unwrap_err();
        assert_eq!(kinds(errors.field(0, "id")), vec![FieldErrorKind::MissingField]);
    }

    #[test]
    fn invalid_bubble_time_reported_on_field() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let mut item = bubble("a");
        item["startTime"] = json!("invalid");
        let errors = validator.validate_batch(&[item]).unwrap_err();
        let start = errors.field(0, "startTime");
        assert_eq!(kinds(start), vec![FieldErrorKind::Format]);
        assert!(start[0].message.contains("MM:SS:MMM"));
        assert!(errors.field(0, "stopTime").is_empty());
    }

    #[test]
    fn bubble_time_as_number_rejected() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let mut item = bubble("a");
        item["stopTime"] = json!(10.0);
        let errors = validator.validate_batch(&[item]).unwrap_err();
        assert_eq!(kinds(errors.field(0, "stopTime")), vec![FieldErrorKind::Format]);
    }

    #[test]
    fn invalid_comment_time_reported_on_end_time() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let mut item = comment("c");
        item["endTime"] = json!("later");
        let errors = validator.validate_batch(&[item]).unwrap_err();
        let end = errors.field(0, "endTime");
        assert_eq!(kinds(end), vec![FieldErrorKind::Format]);
        assert!(end[0].message.contains("seconds as float"));
    }

    #[test]
    fn all_item_errors_accumulate() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let item = json!({
            "layer": "12345678901",
            "startTime": "1:2",
            "stopTime": "x:y:z",
            "color": "#FFFFFFFF"
        });
        let errors = validator.validate_batch(&[item]).unwrap_err();
        assert_eq!(kinds(errors.field(0, "id")), vec![FieldErrorKind::MissingField]);
        assert_eq!(kinds(errors.field(0, "layer")), vec![FieldErrorKind::TooLong]);
        assert_eq!(kinds(errors.field(0, "bubbleName")), vec![FieldErrorKind::MissingField]);
        assert_eq!(kinds(errors.field(0, "startTime")), vec![FieldErrorKind::Format]);
        assert_eq!(kinds(errors.field(0, "stopTime")), vec![FieldErrorKind::Format]);
        assert_eq!(kinds(errors.field(0, "color")), vec![FieldErrorKind::TooLong]);
        assert_eq!(errors.error_count(), 6);
    }

    #[test]
    fn errors_keyed_by_batch_index() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let mut bad = comment("c2");
        bad["startTime"] = json!("x");
        let errors = validator
            .validate_batch(&[comment("c1"), bad, comment("c3")])
            .unwrap_err();
        assert_eq!(errors.items.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn non_object_item_rejected() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let errors = validator.validate_batch(&[json!("nope")]).unwrap_err();
        assert_eq!(kinds(errors.field(0, ITEM_FIELD)), vec![FieldErrorKind::InvalidItem]);
    }

    #[test]
    fn external_id_length_capped() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let errors = validator
            .validate_batch(&[comment(&"x".repeat(51))])
            .unwrap_err();
        assert_eq!(kinds(errors.field(0, "id")), vec![FieldErrorKind::TooLong]);
        assert!(validator.validate_batch(&[comment(&"x".repeat(50))]).is_ok());
    }

    #[test]
    fn color_format_is_not_checked() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let mut item = bubble("a");
        item["color"] = json!("teal");
        assert!(validator.validate_batch(&[item]).is_ok());
    }

    // -- batch: duplicates -------------------------------------------------

    #[test]
    fn duplicate_ids_produce_single_batch_error() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let errors = validator
            .validate_batch(&[bubble("x"), bubble("ok"), bubble("x"), bubble("x")])
            .unwrap_err();
        assert_eq!(errors.batch.len(), 1);
        assert_eq!(errors.batch[0].kind, FieldErrorKind::DuplicateId);
        assert_eq!(errors.batch[0].message, "Duplicate bubble IDs are not allowed");
        assert!(errors.items.is_empty());
    }

    #[test]
    fn duplicate_check_runs_alongside_item_errors() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let mut bad = comment("x");
        bad["startTime"] = json!("bad");
        let errors = validator.validate_batch(&[comment("x"), bad]).unwrap_err();
        assert_eq!(errors.batch.len(), 1);
        assert_eq!(errors.batch[0].message, "Duplicate comment IDs are not allowed");
        assert_eq!(kinds(errors.field(1, "startTime")), vec![FieldErrorKind::Format]);
    }

    // -- single item against stored keys -----------------------------------

    #[test]
    fn validate_one_rejects_id_held_by_other_record() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let existing = ExistingKeys::from([("a".to_string(), 10), ("b".to_string(), 11)]);
        let errors = validator
            .validate_one(&bubble("b"), &existing, Some(10))
            .unwrap_err();
        assert_eq!(kinds(errors.field(0, "id")), vec![FieldErrorKind::NotUnique]);
    }

    #[test]
    fn validate_one_allows_record_keeping_its_own_id() {
        let validator = AnnotationValidator::new(AnnotationKind::Bubble);
        let existing = ExistingKeys::from([("a".to_string(), 10)]);
        assert!(validator.validate_one(&bubble("a"), &existing, Some(10)).is_ok());
    }

    #[test]
    fn validate_one_create_rejects_any_existing_id() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let existing = ExistingKeys::from([("a".to_string(), 10)]);
        assert!(validator.validate_one(&comment("a"), &existing, None).is_err());
        assert!(validator.validate_one(&comment("new"), &existing, None).is_ok());
    }

    #[test]
    fn validate_one_combines_field_and_uniqueness_errors() {
        let validator = AnnotationValidator::new(AnnotationKind::Comment);
        let existing = ExistingKeys::from([("a".to_string(), 10)]);
        let mut item = comment("a");
        item["text"] = json!("");
        let errors = validator.validate_one(&item, &existing, None).unwrap_err();
        assert_eq!(kinds(errors.field(0, "id")), vec![FieldErrorKind::NotUnique]);
        assert_eq!(kinds(errors.field(0, "text")), vec![FieldErrorKind::MissingField]);
    }

    // -- section payloads --------------------------------------------------

    #[test]
    fn section_only_validates_present_collections() {
        let payload: SectionPayload =
            serde_json::from_value(json!({"bubbles": [bubble("a")]})).unwrap();
        let batch = validate_section(&payload).unwrap();
        assert_eq!(batch.bubbles.as_ref().map(Vec::len), Some(1));
        assert!(batch.comments.is_none());
    }

    #[test]
    fn section_errors_keyed_by_collection() {
        let payload: SectionPayload = serde_json::from_value(json!({
            "bubbles": [bubble("a"), bubble("a")],
            "comments": [comment("c")]
        }))
        .unwrap();
        let errors = validate_section(&payload).unwrap_err();
        assert!(errors.get(AnnotationKind::Bubble).is_some());
        assert!(errors.get(AnnotationKind::Comment).is_none());

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json["bubbles"]["non_field_errors"][0]["message"],
            "Duplicate bubble IDs are not allowed"
        );
    }

    #[test]
    fn section_item_errors_serialize_by_index_and_field() {
        let mut bad = bubble("a");
        bad["startTime"] = json!("invalid");
        let payload: SectionPayload =
            serde_json::from_value(json!({"bubbles": [bad], "comments": []})).unwrap();
        let json = serde_json::to_value(validate_section(&payload).unwrap_err()).unwrap();
        assert_eq!(json["bubbles"]["items"]["0"]["startTime"][0]["kind"], "FORMAT");
    }
}
