//! Grant resolution — from a user's grants to the set of locations
//! they can act on.

use std::collections::HashMap;
use std::sync::Arc;

use revly_core::error::RevlyResult;
use revly_core::models::grant::{AccessScope, Permission, PermissionSet};
use revly_core::repository::{GrantRepository, LocationGroupRepository, LocationRepository};
use tracing::warn;
use uuid::Uuid;

use crate::hierarchy::HierarchyStore;
use crate::index::HierarchyIndex;

/// A grant whose scope references a group or location that no longer
/// exists. Reported alongside successful resolution, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingGrant {
    pub grant_id: Uuid,
    pub scope: AccessScope,
}

/// The resolved access of one user in one organization.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAccess {
    /// Location id -> merged permissions across every covering grant.
    pub locations: HashMap<Uuid, PermissionSet>,
    /// Grants that referenced deleted groups or locations.
    pub dangling: Vec<DanglingGrant>,
}

impl ResolvedAccess {
    /// True iff the location is covered and its merged permission set
    /// allows the action.
    pub fn can(&self, location_id: Uuid, permission: Permission) -> bool {
        self.locations
            .get(&location_id)
            .is_some_and(|set| set.allows(permission))
    }

    pub fn location_ids(&self) -> Vec<Uuid> {
        self.locations.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Anything that can answer a resolve query: the bare resolver, or the
/// cache wrapping it.
pub trait ResolveAccess: Send + Sync {
    fn resolve(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> impl Future<Output = RevlyResult<Arc<ResolvedAccess>>> + Send;
}

/// A shared cache can sit behind the gate while mutation paths keep a
/// handle for invalidation.
impl<R: ResolveAccess> ResolveAccess for Arc<R> {
    async fn resolve(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RevlyResult<Arc<ResolvedAccess>> {
        (**self).resolve(user_id, organization_id).await
    }
}

/// Resolves a user's grants against a hierarchy snapshot.
///
/// Generic over the repository traits so the resolver itself never
/// touches the database crate.
pub struct AccessResolver<G, L, A>
where
    G: LocationGroupRepository,
    L: LocationRepository,
    A: GrantRepository,
{
    hierarchy: HierarchyStore<G, L>,
    grants: A,
}

impl<G, L, A> AccessResolver<G, L, A>
where
    G: LocationGroupRepository,
    L: LocationRepository,
    A: GrantRepository,
{
    pub fn new(hierarchy: HierarchyStore<G, L>, grants: A) -> Self {
        Self { hierarchy, grants }
    }

    fn merge(
        locations: &mut HashMap<Uuid, PermissionSet>,
        location_id: Uuid,
        permissions: &PermissionSet,
    ) {
        locations
            .entry(location_id)
            .and_modify(|set| set.union_with(permissions))
            .or_insert_with(|| permissions.clone());
    }

    fn apply_all_locations(
        index: &HierarchyIndex,
        locations: &mut HashMap<Uuid, PermissionSet>,
        permissions: &PermissionSet,
    ) {
        for location in index.locations().filter(|l| l.is_active) {
            Self::merge(locations, location.id, permissions);
        }
    }
}

impl<G, L, A> ResolveAccess for AccessResolver<G, L, A>
where
    G: LocationGroupRepository,
    L: LocationRepository,
    A: GrantRepository,
{
    async fn resolve(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RevlyResult<Arc<ResolvedAccess>> {
        // 1. Load the user's grants. No grants means no access; skip
        //    the hierarchy load entirely.
        let grants = self
            .grants
            .list_by_user(organization_id, user_id)
            .await?;
        if grants.is_empty() {
            return Ok(Arc::new(ResolvedAccess::default()));
        }

        // 2. One snapshot for all grants, so every subtree walk sees
        //    the same tree.
        let index = self.hierarchy.snapshot(organization_id).await?;

        // 3. Fold each grant into the map. Union semantics: a location
        //    covered by several grants gets the union of their
        //    permission sets, and an unrestricted set absorbs the
        //    rest.
        let mut locations = HashMap::new();
        let mut dangling = Vec::new();

        for grant in &grants {
            match grant.scope {
                AccessScope::AllLocations => {
                    Self::apply_all_locations(&index, &mut locations, &grant.permissions);
                }
                AccessScope::Location(location_id) => match index.location(location_id) {
                    Some(location) if location.is_active => {
                        Self::merge(&mut locations, location_id, &grant.permissions);
                    }
                    // Inactive: the row exists, access is suppressed.
                    Some(_) => {}
                    None => {
                        warn!(
                            grant_id = %grant.id,
                            %organization_id,
                            %location_id,
                            "grant references a deleted location"
                        );
                        dangling.push(DanglingGrant {
                            grant_id: grant.id,
                            scope: grant.scope,
                        });
                    }
                },
                AccessScope::Group(group_id) => {
                    if !index.contains_group(group_id) {
                        warn!(
                            grant_id = %grant.id,
                            %organization_id,
                            %group_id,
                            "grant references a deleted location group"
                        );
                        dangling.push(DanglingGrant {
                            grant_id: grant.id,
                            scope: grant.scope,
                        });
                        continue;
                    }
                    let subtree = index.subtree(group_id)?;
                    for location in subtree.locations.iter().filter(|l| l.is_active) {
                        Self::merge(&mut locations, location.id, &grant.permissions);
                    }
                }
            }
        }

        Ok(Arc::new(ResolvedAccess {
            locations,
            dangling,
        }))
    }
}
