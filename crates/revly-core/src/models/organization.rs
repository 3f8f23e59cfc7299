//! Organization domain model.
//!
//! Organizations are the top-level tenant entity. Every location group,
//! location, and access grant belongs to exactly one organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription plan an organization is on. Limits and feature gating
/// key off this; the access engine only reads `is_active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Trial,
    Standard,
    Enterprise,
}

/// An organization is a business operating one or more locations.
///
/// `hierarchy_levels` holds the organization's configured level labels
/// (e.g. `["Region", "District"]`); `LocationGroup::group_type` values
/// are drawn from this list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// URL-safe unique identifier (e.g., `acme-stores`).
    pub slug: String,
    pub max_locations: u32,
    pub max_users: u32,
    pub plan: SubscriptionPlan,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub hierarchy_levels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub slug: String,
    pub max_locations: u32,
    pub max_users: u32,
    pub plan: SubscriptionPlan,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub hierarchy_levels: Vec<String>,
}

/// Fields that can be updated on an existing organization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub max_locations: Option<u32>,
    pub max_users: Option<u32>,
    pub plan: Option<SubscriptionPlan>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub plan_expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
    pub hierarchy_levels: Option<Vec<String>>,
}
