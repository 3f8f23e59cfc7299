//! Access grant domain model.
//!
//! A grant gives one user access to a slice of one organization's
//! locations. The slice is described by an [`AccessScope`], the actions
//! allowed on it by a [`PermissionSet`]. A user may hold any number of
//! grants; resolution unions them all.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An action a user can perform on a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read reviews and reports.
    View,
    /// Edit location details and settings.
    Edit,
    /// Reply to customer reviews.
    Respond,
    /// Administer users and grants for the location.
    Manage,
}

/// The permissions attached to a grant.
///
/// An empty set means unrestricted: every permission is implied. Most
/// grants are issued without an explicit permission list, so the empty
/// set is the common case, not a degenerate one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// The unrestricted set.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.0.is_empty() || self.0.contains(&permission)
    }

    /// Union in another set. If either side is unrestricted the result
    /// is unrestricted.
    pub fn union_with(&mut self, other: &PermissionSet) {
        if self.0.is_empty() {
            return;
        }
        if other.0.is_empty() {
            self.0.clear();
            return;
        }
        self.0.extend(other.0.iter().copied());
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The slice of an organization a grant covers. Exactly one shape per
/// grant; the variants are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    /// Every active location in the organization.
    AllLocations,
    /// A single location.
    Location(Uuid),
    /// Every location in the group's subtree, the group included.
    Group(Uuid),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub scope: AccessScope,
    pub permissions: PermissionSet,
    pub created_at: DateTime<Utc>,
}

/// Fields required to issue a grant. Grants are immutable once issued;
/// changing access means revoking and re-issuing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccessGrant {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub scope: AccessScope,
    pub permissions: PermissionSet,
}
