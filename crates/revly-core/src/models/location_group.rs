//! Location group domain model.
//!
//! Groups form a forest per organization: a group with no parent is a
//! root (level 0), and every child sits at `parent.level + 1`. Levels
//! are maintained by the hierarchy store, never supplied by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationGroup {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// `None` means this group is a root of the organization's forest.
    pub parent_group_id: Option<Uuid>,
    pub name: String,
    /// Label drawn from the organization's configured `hierarchy_levels`
    /// (e.g. `Region`, `District`). Free text; not validated against
    /// structure.
    pub group_type: String,
    /// Depth in the tree. 0 for roots, `parent.level + 1` otherwise.
    pub level: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a group. The level is computed from the
/// parent at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocationGroup {
    pub organization_id: Uuid,
    pub parent_group_id: Option<Uuid>,
    pub name: String,
    pub group_type: String,
}

/// Rename or retype a group. Moving it is a separate operation with
/// its own cycle validation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateLocationGroup {
    pub name: Option<String>,
    pub group_type: Option<String>,
}
