//! Reconciliation of a section's stored annotations against a new batch.
//!
//! Two strategies are exposed as [`Reconcile`] variants:
//!
//! - [`Reconcile::Update`] diffs one collection by external id: matched
//!   records are overwritten in place (their storage id and creation time
//!   survive), new ids are inserted, ids missing from the batch are deleted.
//! - [`Reconcile::Replace`] deletes every annotation of the section (both
//!   kinds) and inserts the batch fresh.
//!
//! The diff is a pure [`ReconcilePlan`]; writes go through an
//! [`AnnotationStore`]. Stores backed by a database run a whole reconcile in
//! one transaction so a failed write leaves nothing behind.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, AnnotationKind, RecordHandle, StoredAnnotation};
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Failure reported by an [`AnnotationStore`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A write would duplicate `(section, kind, external id)`.
    #[error("Duplicate annotation id violates unique constraint: {0}")]
    Constraint(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Storage error: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(msg) => CoreError::Conflict(msg),
            StoreError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

/// Persistence operations the reconciler needs.
///
/// Implementations must enforce uniqueness of `(section, kind, external id)`
/// and fail with [`StoreError::Constraint`] rather than overwrite.
#[async_trait]
pub trait AnnotationStore: Send {
    /// All annotations of one kind under a section, in creation order.
    async fn load_annotations(
        &mut self,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<Vec<StoredAnnotation>, StoreError>;

    async fn create_annotation(
        &mut self,
        section_id: DbId,
        annotation: &Annotation,
    ) -> Result<StoredAnnotation, StoreError>;

    /// Overwrite the fields of an existing record. Its id, section and
    /// creation time are kept.
    async fn update_annotation(
        &mut self,
        handle: RecordHandle,
        annotation: &Annotation,
    ) -> Result<StoredAnnotation, StoreError>;

    async fn delete_annotation(&mut self, handle: RecordHandle) -> Result<(), StoreError>;

    /// Delete every annotation of one kind under a section. Returns the count.
    async fn delete_all_annotations(
        &mut self,
        section_id: DbId,
        kind: AnnotationKind,
    ) -> Result<u64, StoreError>;
}

// ---------------------------------------------------------------------------
// Batches and summaries
// ---------------------------------------------------------------------------

/// Validated annotations for a section, per collection.
///
/// `None` means the collection was not part of the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionBatch {
    pub bubbles: Option<Vec<Annotation>>,
    pub comments: Option<Vec<Annotation>>,
}

impl SectionBatch {
    pub fn set(&mut self, kind: AnnotationKind, annotations: Vec<Annotation>) {
        match kind {
            AnnotationKind::Bubble => self.bubbles = Some(annotations),
            AnnotationKind::Comment => self.comments = Some(annotations),
        }
    }

    pub fn take(&mut self, kind: AnnotationKind) -> Option<Vec<Annotation>> {
        match kind {
            AnnotationKind::Bubble => self.bubbles.take(),
            AnnotationKind::Comment => self.comments.take(),
        }
    }
}

/// Write counts for one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

/// Write counts for a whole section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub bubbles: ReconcileSummary,
    pub comments: ReconcileSummary,
}

impl SectionSummary {
    fn kind_mut(&mut self, kind: AnnotationKind) -> &mut ReconcileSummary {
        match kind {
            AnnotationKind::Bubble => &mut self.bubbles,
            AnnotationKind::Comment => &mut self.comments,
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The writes that turn a stored collection into a target batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub creates: Vec<Annotation>,
    pub updates: Vec<(RecordHandle, Annotation)>,
    /// Matched records whose fields already equal the batch item.
    pub unchanged: Vec<RecordHandle>,
    pub deletes: Vec<RecordHandle>,
}

impl ReconcilePlan {
    /// Diff `existing` against `incoming` by external id.
    ///
    /// `incoming` must already be free of duplicate ids.
    pub fn diff(existing: &[StoredAnnotation], incoming: Vec<Annotation>) -> Self {
        let index: HashMap<&str, &StoredAnnotation> =
            existing.iter().map(|r| (r.external_id(), r)).collect();
        let mut seen: HashSet<String> = HashSet::with_capacity(incoming.len());
        let mut plan = Self::default();

        for annotation in incoming {
            seen.insert(annotation.external_id.clone());
            match index.get(annotation.external_id.as_str()) {
                Some(stored) if stored.annotation == annotation => {
                    plan.unchanged.push(stored.handle());
                }
                Some(stored) => plan.updates.push((stored.handle(), annotation)),
                None => plan.creates.push(annotation),
            }
        }

        plan.deletes = existing
            .iter()
            .filter(|r| !seen.contains(r.external_id()))
            .map(StoredAnnotation::handle)
            .collect();

        plan
    }

    pub fn is_noop(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Apply the plan's writes. Stops at the first failing write.
    pub async fn apply<S>(self, store: &mut S, section_id: DbId) -> Result<ReconcileSummary, StoreError>
    where
        S: AnnotationStore + ?Sized,
    {
        let mut summary = ReconcileSummary {
            unchanged: self.unchanged.len(),
            ..ReconcileSummary::default()
        };

        for (handle, annotation) in &self.updates {
            store.update_annotation(*handle, annotation).await?;
            summary.updated += 1;
        }
        for annotation in &self.creates {
            store.create_annotation(section_id, annotation).await?;
            summary.created += 1;
        }
        for handle in self.deletes {
            store.delete_annotation(handle).await?;
            summary.deleted += 1;
        }

        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Reconciliation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconcile {
    /// Identity-preserving diff, per collection present in the batch.
    #[default]
    Update,
    /// Delete everything under the section, then insert the batch.
    Replace,
}

impl Reconcile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Replace => "replace",
        }
    }

    /// Run this strategy for `batch` under `section_id`.
    pub async fn apply<S>(
        self,
        store: &mut S,
        section_id: DbId,
        batch: SectionBatch,
    ) -> Result<SectionSummary, StoreError>
    where
        S: AnnotationStore + ?Sized,
    {
        match self {
            Self::Update => update_section(store, section_id, batch).await,
            Self::Replace => replace_section(store, section_id, batch).await,
        }
    }
}

/// Identity-preserving reconcile of one collection.
///
/// Touches only `(section_id, kind)`; `incoming` must all be of `kind`.
pub async fn reconcile_collection<S>(
    store: &mut S,
    section_id: DbId,
    kind: AnnotationKind,
    incoming: Vec<Annotation>,
) -> Result<ReconcileSummary, StoreError>
where
    S: AnnotationStore + ?Sized,
{
    if let Some(stray) = incoming.iter().find(|a| a.kind() != kind) {
        return Err(StoreError::Backend(format!(
            "{} '{}' submitted in the {} collection",
            stray.kind().as_str(),
            stray.external_id,
            kind.collection()
        )));
    }

    let existing = store.load_annotations(section_id, kind).await?;
    ReconcilePlan::diff(&existing, incoming)
        .apply(store, section_id)
        .await
}

/// [`Reconcile::Update`] over every collection present in `batch`.
pub async fn update_section<S>(
    store: &mut S,
    section_id: DbId,
    mut batch: SectionBatch,
) -> Result<SectionSummary, StoreError>
where
    S: AnnotationStore + ?Sized,
{
    let mut summary = SectionSummary::default();
    for kind in AnnotationKind::ALL {
        if let Some(incoming) = batch.take(kind) {
            *summary.kind_mut(kind) = reconcile_collection(store, section_id, kind, incoming).await?;
        }
    }
    Ok(summary)
}

/// [`Reconcile::Replace`]: clear both collections, then insert the batch.
///
/// Stored records are never reused, even when an external id reappears.
pub async fn replace_section<S>(
    store: &mut S,
    section_id: DbId,
    mut batch: SectionBatch,
) -> Result<SectionSummary, StoreError>
where
    S: AnnotationStore + ?Sized,
{
    let mut summary = SectionSummary::default();
    for kind in AnnotationKind::ALL {
        let deleted = store.delete_all_annotations(section_id, kind).await?;
        let kind_summary = summary.kind_mut(kind);
        kind_summary.deleted = deleted as usize;

        for annotation in batch.take(kind).unwrap_or_default() {
            store.create_annotation(section_id, &annotation).await?;
            kind_summary.created += 1;
        }
    }
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
