//! In-memory [`AnnotationStore`] for the reconciler tests, enforcing the same
//! uniqueness rule as the database. Writes apply immediately, with no
//! rollback, so a failure partway through a reconcile leaves earlier writes
//! in place.

use async_trait::async_trait;
use chrono::Utc;

use crate::annotation::{Annotation, AnnotationKind, RecordHandle, StoredAnnotation};
use crate::reconcile::{AnnotationStore, StoreError};
use crate::types::DbId;

#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: DbId,
    records: Vec<StoredAnnotation>,
}

impl MemoryStore {
    /// Number of records across all sections and kinds.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    fn conflicts(&self, section_id: DbId, annotation: &Annotation, except: Option<DbId>) -> bool {
        self.records.iter().any(|r| {
            r.section_id == section_id
                && r.annotation.kind() == annotation.kind()
                && r.annotation.external_id == annotation.external_id
                && Some(r.id) != except
        })
    }

    fn position(&self, handle: RecordHandle) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|r| r.id == handle.id && r.annotation.kind() == handle.kind)
            .ok_or(StoreError::NotFound {
                entity: handle.kind.as_str(),
                id: handle.id,
            })
    }
}

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn load_annotations(
        &mut self,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<Vec<StoredAnnotation>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.section_id == section_id && r.annotation.kind() == kind)
            .cloned()
            .collect())
    }

    async fn create_annotation(
        &mut self,
        section_id: DbId,
        annotation: &Annotation,
    ) -> Result<StoredAnnotation, StoreError> {
        if self.conflicts(section_id, annotation, None) {
            return Err(StoreError::Constraint(format!(
                "{} '{}' already exists in section {section_id}",
                annotation.kind().as_str(),
                annotation.external_id
            )));
        }

        self.next_id += 1;
        let now = Utc::now();
        let record = StoredAnnotation {
            id: self.next_id,
            section_id,
            annotation: annotation.clone(),
            created_at: now,
            updated_at: now,
        };
        self.records.push(record.clone());
        Ok(record)
    }

    async fn update_annotation(
        &mut self,
        handle: RecordHandle,
        annotation: &Annotation,
    ) -> Result<StoredAnnotation, StoreError> {
        if annotation.kind() != handle.kind {
            return Err(StoreError::Backend(format!(
                "cannot store a {} in a {} record",
                annotation.kind().as_str(),
                handle.kind.as_str()
            )));
        }

        let pos = self.position(handle)?;
        let section_id = self.records[pos].section_id;
        if self.conflicts(section_id, annotation, Some(handle.id)) {
            return Err(StoreError::Constraint(format!(
                "{} '{}' already exists in section {section_id}",
                annotation.kind().as_str(),
                annotation.external_id
            )));
        }

        let record = &mut self.records[pos];
        record.annotation = annotation.clone();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_annotation(&mut self, handle: RecordHandle) -> Result<(), StoreError> {
        let pos = self.position(handle)?;
        self.records.remove(pos);
        Ok(())
    }

    async fn delete_all_annotations(
        &mut self,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<u64, StoreError> {
        let before = self.records.len();
        self.records
            .retain(|r| !(r.section_id == section_id && r.annotation.kind() == kind));
        Ok((before - self.records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::CommentFields;
    use crate::time_codec::TimeOffset;
    use assert_matches::assert_matches;

    fn comment(id: &str) -> Annotation {
        Annotation::comment(
            id,
            CommentFields {
                start_time: TimeOffset::ZERO,
                end_time: TimeOffset::ZERO,
                text: "x".into(),
            },
        )
    }

    #[tokio::test]
    async fn duplicate_create_is_constraint_error() {
        let mut store = MemoryStore::default();
        store.create_annotation(1, &comment("a")).await.unwrap();
        let err = store.create_annotation(1, &comment("a")).await.unwrap_err();
        assert_matches!(err, StoreError::Constraint(_));
        // Same id under another section is fine.
        store.create_annotation(2, &comment("a")).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn update_into_taken_id_is_constraint_error() {
        let mut store = MemoryStore::default();
        store.create_annotation(1, &comment("a")).await.unwrap();
        let b = store.create_annotation(1, &comment("b")).await.unwrap();
        let err = store
            .update_annotation(b.handle(), &comment("a"))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Constraint(_));
    }

    #[tokio::test]
    async fn delete_unknown_handle_is_not_found() {
        let mut store = MemoryStore::default();
        let handle = RecordHandle {
            kind: AnnotationKind::Comment,
            id: 42,
        };
        assert_matches!(
            store.delete_annotation(handle).await,
            Err(StoreError::NotFound { id: 42, .. })
        );
    }
}
