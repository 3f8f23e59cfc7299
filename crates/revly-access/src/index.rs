//! In-memory snapshot of one organization's location hierarchy.
//!
//! The index is built from a single whole-organization load, so every
//! traversal made through it observes one consistent state. Nodes live
//! in flat vectors; relationships are id references resolved through
//! slot maps rather than owned child pointers. All walks are explicit
//! and guarded, so a corrupted parent chain surfaces as an error
//! instead of an infinite loop.

use std::collections::{HashMap, HashSet, VecDeque};

use revly_core::models::location::Location;
use revly_core::models::location_group::LocationGroup;
use uuid::Uuid;

use crate::error::AccessError;

/// A group and everything reachable downward from it, the group
/// included.
#[derive(Debug, Clone, Default)]
pub struct Subtree {
    pub groups: Vec<LocationGroup>,
    pub locations: Vec<Location>,
}

/// Flat-index snapshot of an organization's groups and locations.
#[derive(Debug, Clone)]
pub struct HierarchyIndex {
    groups: Vec<LocationGroup>,
    group_slots: HashMap<Uuid, usize>,
    /// Parent group id -> child group ids, in load order.
    children: HashMap<Uuid, Vec<Uuid>>,
    locations: Vec<Location>,
    location_slots: HashMap<Uuid, usize>,
    /// Group id -> slots of locations directly in that group.
    group_locations: HashMap<Uuid, Vec<usize>>,
    max_depth: usize,
}

impl HierarchyIndex {
    /// Build the index from one organization's full group and location
    /// sets. A location pointing at a group that no longer exists stays
    /// reachable through the flat iterator (and thus all-locations
    /// grants) but under no subtree.
    pub fn build(groups: Vec<LocationGroup>, locations: Vec<Location>, max_depth: usize) -> Self {
        let mut group_slots = HashMap::with_capacity(groups.len());
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (slot, group) in groups.iter().enumerate() {
            group_slots.insert(group.id, slot);
        }
        for group in &groups {
            if let Some(parent_id) = group.parent_group_id {
                children.entry(parent_id).or_default().push(group.id);
            }
        }

        let mut location_slots = HashMap::with_capacity(locations.len());
        let mut group_locations: HashMap<Uuid, Vec<usize>> = HashMap::new();
        for (slot, location) in locations.iter().enumerate() {
            location_slots.insert(location.id, slot);
            if let Some(group_id) = location.location_group_id {
                group_locations.entry(group_id).or_default().push(slot);
            }
        }

        Self {
            groups,
            group_slots,
            children,
            locations,
            location_slots,
            group_locations,
            max_depth,
        }
    }

    pub fn group(&self, id: Uuid) -> Option<&LocationGroup> {
        self.group_slots.get(&id).map(|slot| &self.groups[*slot])
    }

    pub fn contains_group(&self, id: Uuid) -> bool {
        self.group_slots.contains_key(&id)
    }

    pub fn location(&self, id: Uuid) -> Option<&Location> {
        self.location_slots
            .get(&id)
            .map(|slot| &self.locations[*slot])
    }

    /// All locations of the organization, grouped or not.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Every group and location reachable downward from `group_id`,
    /// inclusive, in breadth-first order.
    pub fn subtree(&self, group_id: Uuid) -> Result<Subtree, AccessError> {
        if !self.contains_group(group_id) {
            return Err(AccessError::GroupNotFound(group_id));
        }

        let mut out = Subtree::default();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([group_id]);

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                return Err(AccessError::Corrupt(format!(
                    "group {id} reachable twice; parent chain is cyclic"
                )));
            }
            let group = self
                .group(id)
                .ok_or_else(|| AccessError::Corrupt(format!("group {id} missing from index")))?;
            out.groups.push(group.clone());

            if let Some(slots) = self.group_locations.get(&id) {
                for slot in slots {
                    out.locations.push(self.locations[*slot].clone());
                }
            }
            if let Some(child_ids) = self.children.get(&id) {
                queue.extend(child_ids.iter().copied());
            }
        }

        Ok(out)
    }

    /// Direct child groups and directly-attached locations of a group.
    pub fn children_of(
        &self,
        group_id: Uuid,
    ) -> Result<(Vec<LocationGroup>, Vec<Location>), AccessError> {
        if !self.contains_group(group_id) {
            return Err(AccessError::GroupNotFound(group_id));
        }
        let groups = self
            .children
            .get(&group_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.group(*id))
            .cloned()
            .collect();
        let locations = self
            .group_locations
            .get(&group_id)
            .into_iter()
            .flatten()
            .map(|slot| self.locations[*slot].clone())
            .collect();
        Ok((groups, locations))
    }

    /// Ancestor group ids of `group_id`, nearest first, the group
    /// itself excluded.
    pub fn ancestors(&self, group_id: Uuid) -> Result<Vec<Uuid>, AccessError> {
        let mut current = self
            .group(group_id)
            .ok_or(AccessError::GroupNotFound(group_id))?;
        let mut out = Vec::new();

        for _ in 0..self.max_depth {
            let Some(parent_id) = current.parent_group_id else {
                return Ok(out);
            };
            let parent = self.group(parent_id).ok_or_else(|| {
                AccessError::Corrupt(format!(
                    "group {} references missing parent {parent_id}",
                    current.id
                ))
            })?;
            out.push(parent_id);
            current = parent;
        }

        Err(AccessError::Corrupt(format!(
            "ancestor chain of group {group_id} exceeds depth limit {}",
            self.max_depth
        )))
    }

    /// Check that moving `group_id` under `new_parent_id` keeps the
    /// tree acyclic. Rejects moving a group under itself or under any
    /// of its own descendants. Moving to the root (`None`) is always
    /// structurally valid.
    pub fn validate_reparent(
        &self,
        group_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<(), AccessError> {
        if !self.contains_group(group_id) {
            return Err(AccessError::GroupNotFound(group_id));
        }
        let Some(parent_id) = new_parent_id else {
            return Ok(());
        };
        if parent_id == group_id {
            return Err(AccessError::Cycle(group_id));
        }
        if !self.contains_group(parent_id) {
            return Err(AccessError::GroupNotFound(parent_id));
        }
        // The new parent is inside the moved subtree exactly when the
        // moved group appears among its ancestors.
        if self.ancestors(parent_id)?.contains(&group_id) {
            return Err(AccessError::Cycle(group_id));
        }
        Ok(())
    }

    /// Compute the `(group_id, new_level)` assignments a re-parent
    /// requires: the moved group and every descendant whose depth
    /// changes. Validates the move first; nothing is returned for a
    /// move that would be rejected.
    pub fn reparent_levels(
        &self,
        group_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<Vec<(Uuid, u32)>, AccessError> {
        self.validate_reparent(group_id, new_parent_id)?;

        let base = match new_parent_id {
            Some(parent_id) => {
                let parent = self.group(parent_id).ok_or_else(|| {
                    AccessError::Corrupt(format!("group {parent_id} missing from index"))
                })?;
                parent.level + 1
            }
            None => 0,
        };

        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([(group_id, base)]);

        while let Some((id, level)) = queue.pop_front() {
            if !visited.insert(id) {
                return Err(AccessError::Corrupt(format!(
                    "group {id} reachable twice; parent chain is cyclic"
                )));
            }
            if level as usize >= self.max_depth {
                return Err(AccessError::DepthLimit(id));
            }
            let node = self
                .group(id)
                .ok_or_else(|| AccessError::Corrupt(format!("group {id} missing from index")))?;
            if node.level != level {
                out.push((id, level));
            }
            if let Some(child_ids) = self.children.get(&id) {
                for child in child_ids {
                    queue.push_back((*child, level + 1));
                }
            }
        }

        Ok(out)
    }
}
