//! Transactional PostgreSQL implementation of [`AnnotationStore`].

use async_trait::async_trait;
use bubblemachine_core::annotation::{Annotation, AnnotationKind, RecordHandle, StoredAnnotation};
use bubblemachine_core::reconcile::{AnnotationStore, StoreError};
use bubblemachine_core::types::DbId;
use sqlx::{PgConnection, Postgres, Transaction};

use crate::repositories::AnnotationRepo;
use crate::{DbPool, UNIQUE_VIOLATION};

/// An [`AnnotationStore`] whose writes all land in one database transaction.
///
/// Nothing is visible to other connections until [`commit`](Self::commit).
/// Dropping the store without committing rolls every write back, so a
/// reconcile that fails halfway leaves the section untouched.
pub struct PgAnnotationStore {
    tx: Transaction<'static, Postgres>,
}

impl PgAnnotationStore {
    /// Open a transaction on `pool`.
    pub async fn begin(pool: &DbPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// The transaction's connection, for repository calls that must share
    /// the transaction (locking the section, bumping its timestamp).
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

/// Map a sqlx error into the store's vocabulary. Unique violations become
/// [`StoreError::Constraint`] carrying the constraint name.
fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            return StoreError::Constraint(constraint.to_string());
        }
    }
    tracing::error!(error = %err, "Annotation store query failed");
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl AnnotationStore for PgAnnotationStore {
    async fn load_annotations(
        &mut self,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<Vec<StoredAnnotation>, StoreError> {
        AnnotationRepo::list_by_section(&mut *self.tx, section_id, kind)
            .await
            .map_err(store_error)
    }

    async fn create_annotation(
        &mut self,
        section_id: DbId,
        annotation: &Annotation,
    ) -> Result<StoredAnnotation, StoreError> {
        let stored = AnnotationRepo::create(&mut *self.tx, section_id, annotation)
            .await
            .map_err(store_error)?;
        tracing::debug!(
            section_id,
            kind = annotation.kind().as_str(),
            external_id = %annotation.external_id,
            id = stored.id,
            "Annotation created"
        );
        Ok(stored)
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

        let stored = AnnotationRepo::update(&mut *self.tx, handle, annotation)
            .await
            .map_err(store_error)?
            .ok_or(StoreError::NotFound {
                entity: handle.kind.as_str(),
                id: handle.id,
            })?;
        tracing::debug!(
            kind = handle.kind.as_str(),
            id = handle.id,
            external_id = %annotation.external_id,
            "Annotation updated"
        );
        Ok(stored)
    }

    async fn delete_annotation(&mut self, handle: RecordHandle) -> Result<(), StoreError> {
        let deleted = AnnotationRepo::delete(&mut *self.tx, handle)
            .await
            .map_err(store_error)?;
        if !deleted {
            return Err(StoreError::NotFound {
                entity: handle.kind.as_str(),
                id: handle.id,
            });
        }
        tracing::debug!(kind = handle.kind.as_str(), id = handle.id, "Annotation deleted");
        Ok(())
    }

    async fn delete_all_annotations(
        &mut self,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<u64, StoreError> {
        AnnotationRepo::delete_by_section(&mut *self.tx, section_id, kind)
            .await
            .map_err(store_error)
    }
}
