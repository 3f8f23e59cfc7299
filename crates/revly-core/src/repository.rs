//! Persistence traits the storage backends implement.
//!
//! All repository operations are async. Organization-scoped repositories
//! require an `organization_id` parameter to enforce tenant isolation.

use uuid::Uuid;

use crate::error::RevlyResult;
use crate::models::{
    grant::{AccessGrant, CreateAccessGrant},
    location::{CreateLocation, Location, UpdateLocation},
    location_group::{CreateLocationGroup, LocationGroup, UpdateLocationGroup},
    organization::{CreateOrganization, Organization, UpdateOrganization},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organizations (global scope)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = RevlyResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RevlyResult<Organization>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = RevlyResult<Organization>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = RevlyResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = RevlyResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = RevlyResult<PaginatedResult<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Organization-scoped repositories
// ---------------------------------------------------------------------------

pub trait LocationGroupRepository: Send + Sync {
    /// Insert a group at the given level. Levels are computed by the
    /// hierarchy layer, which validates the parent before calling this.
    fn create(
        &self,
        input: CreateLocationGroup,
        level: u32,
    ) -> impl Future<Output = RevlyResult<LocationGroup>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RevlyResult<LocationGroup>> + Send;
    /// All groups of the organization, unpaginated. Hierarchies are
    /// small; traversal layers load them whole to get one consistent
    /// snapshot.
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = RevlyResult<Vec<LocationGroup>>> + Send;
    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocationGroup,
    ) -> impl Future<Output = RevlyResult<LocationGroup>> + Send;
    /// Move a group under a new parent (`None` = make it a root) and
    /// apply the recomputed levels in the same transaction. `levels`
    /// carries one `(group_id, new_level)` entry for the moved group
    /// and every descendant whose depth changed.
    fn reparent(
        &self,
        organization_id: Uuid,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        levels: Vec<(Uuid, u32)>,
    ) -> impl Future<Output = RevlyResult<()>> + Send;
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RevlyResult<()>> + Send;
}

pub trait LocationRepository: Send + Sync {
    fn create(&self, input: CreateLocation) -> impl Future<Output = RevlyResult<Location>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RevlyResult<Location>> + Send;
    /// All locations of the organization, unpaginated, active or not.
    /// Callers filter on `is_active` themselves.
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = RevlyResult<Vec<Location>>> + Send;
    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocation,
    ) -> impl Future<Output = RevlyResult<Location>> + Send;
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RevlyResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Access grants
// ---------------------------------------------------------------------------

pub trait GrantRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAccessGrant,
    ) -> impl Future<Output = RevlyResult<AccessGrant>> + Send;
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RevlyResult<AccessGrant>> + Send;
    /// Every grant the user holds in the organization.
    fn list_by_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = RevlyResult<Vec<AccessGrant>>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = RevlyResult<PaginatedResult<AccessGrant>>> + Send;
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = RevlyResult<()>> + Send;
}
