//! Bubble section model.

use bubblemachine_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `bubble_sections` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BubbleSection {
    pub id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
