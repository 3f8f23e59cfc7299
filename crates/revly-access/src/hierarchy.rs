//! Hierarchy store — tree reads plus structural integrity on writes.
//!
//! Generic over the repository traits so the access layer has no
//! dependency on the database crate. All reads go through a
//! whole-organization snapshot; writes validate against that snapshot
//! before touching the store.

use revly_core::error::RevlyResult;
use revly_core::models::location::Location;
use revly_core::models::location_group::{CreateLocationGroup, LocationGroup};
use revly_core::repository::{LocationGroupRepository, LocationRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::error::AccessError;
use crate::index::{HierarchyIndex, Subtree};

pub struct HierarchyStore<G: LocationGroupRepository, L: LocationRepository> {
    groups: G,
    locations: L,
    config: AccessConfig,
}

impl<G: LocationGroupRepository, L: LocationRepository> HierarchyStore<G, L> {
    pub fn new(groups: G, locations: L, config: AccessConfig) -> Self {
        Self {
            groups,
            locations,
            config,
        }
    }

    /// Load one consistent snapshot of the organization's tree.
    pub async fn snapshot(&self, organization_id: Uuid) -> RevlyResult<HierarchyIndex> {
        let groups = self.groups.list_by_organization(organization_id).await?;
        let locations = self.locations.list_by_organization(organization_id).await?;
        Ok(HierarchyIndex::build(
            groups,
            locations,
            self.config.max_depth,
        ))
    }

    /// The group and everything below it, locations included.
    pub async fn get_subtree(
        &self,
        organization_id: Uuid,
        group_id: Uuid,
    ) -> RevlyResult<Subtree> {
        let index = self.snapshot(organization_id).await?;
        Ok(index.subtree(group_id)?)
    }

    /// Direct children only: one level of groups plus the locations
    /// attached straight to this group.
    pub async fn get_children(
        &self,
        organization_id: Uuid,
        group_id: Uuid,
    ) -> RevlyResult<(Vec<LocationGroup>, Vec<Location>)> {
        let index = self.snapshot(organization_id).await?;
        Ok(index.children_of(group_id)?)
    }

    /// Insert a group, computing its level from the parent.
    ///
    /// A root group gets level 0; a child gets `parent.level + 1`. The
    /// parent must exist in the same organization, which the scoped
    /// lookup enforces.
    pub async fn create_group(&self, input: CreateLocationGroup) -> RevlyResult<LocationGroup> {
        let level = match input.parent_group_id {
            Some(parent_id) => {
                let parent = self
                    .groups
                    .get_by_id(input.organization_id, parent_id)
                    .await?;
                if (parent.level + 1) as usize >= self.config.max_depth {
                    return Err(AccessError::DepthLimit(parent_id).into());
                }
                parent.level + 1
            }
            None => 0,
        };

        self.groups.create(input, level).await
    }

    /// Check whether a move is structurally legal without performing
    /// it.
    pub async fn validate_reparent(
        &self,
        organization_id: Uuid,
        group_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> RevlyResult<()> {
        let index = self.snapshot(organization_id).await?;
        Ok(index.validate_reparent(group_id, new_parent_id)?)
    }

    /// Move a group under a new parent and recompute levels across the
    /// moved subtree. Validation happens before any mutation; the
    /// parent change and all level changes land in one repository
    /// transaction. Returns the number of groups whose level changed.
    pub async fn reparent_group(
        &self,
        organization_id: Uuid,
        group_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> RevlyResult<u32> {
        let index = self.snapshot(organization_id).await?;
        let levels = index.reparent_levels(group_id, new_parent_id)?;
        let releveled = levels.len() as u32;

        self.groups
            .reparent(organization_id, group_id, new_parent_id, levels)
            .await?;

        info!(
            %organization_id,
            %group_id,
            new_parent_id = ?new_parent_id,
            releveled,
            "re-parented location group"
        );
        Ok(releveled)
    }

    /// Delete a group. Only empty groups can go: anything still
    /// holding child groups or locations is rejected so the tree never
    /// silently orphans nodes.
    pub async fn delete_group(&self, organization_id: Uuid, group_id: Uuid) -> RevlyResult<()> {
        let index = self.snapshot(organization_id).await?;
        let (child_groups, child_locations) = index.children_of(group_id)?;
        if !child_groups.is_empty() || !child_locations.is_empty() {
            return Err(AccessError::GroupNotEmpty(group_id).into());
        }
        self.groups.delete(organization_id, group_id).await
    }
}
