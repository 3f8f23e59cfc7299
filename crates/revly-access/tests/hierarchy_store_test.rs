//! Integration tests for the hierarchy store: level maintenance,
//! re-parent validation, and structural deletes through the
//! repository traits.

mod common;

use std::collections::HashMap;

use common::{MemGroupRepo, MemLocationRepo, MemStore, group_input, location_input};
use revly_access::{AccessConfig, HierarchyStore};
use revly_core::RevlyError;
use revly_core::repository::{LocationGroupRepository, LocationRepository};
use uuid::Uuid;

fn engine(store: &MemStore) -> HierarchyStore<MemGroupRepo, MemLocationRepo> {
    HierarchyStore::new(store.groups(), store.locations(), AccessConfig::default())
}

#[tokio::test]
async fn root_groups_get_level_zero() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();

    assert_eq!(west.level, 0);
    assert_eq!(west.parent_group_id, None);
}

#[tokio::test]
async fn child_levels_follow_the_parent() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();
    let ca = hierarchy
        .create_group(group_input(org, Some(west.id), "CA"))
        .await
        .unwrap();
    let la_metro = hierarchy
        .create_group(group_input(org, Some(ca.id), "LA Metro"))
        .await
        .unwrap();

    assert_eq!(ca.level, 1);
    assert_eq!(la_metro.level, 2);
}

#[tokio::test]
async fn parent_from_another_organization_rejected() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();

    let foreign = hierarchy
        .create_group(group_input(org_a, None, "Foreign"))
        .await
        .unwrap();

    let err = hierarchy
        .create_group(group_input(org_b, Some(foreign.id), "Child"))
        .await
        .unwrap_err();

    assert!(matches!(err, RevlyError::NotFound { .. }));
}

#[tokio::test]
async fn insert_past_depth_limit_rejected() {
    let store = MemStore::new();
    let config = AccessConfig {
        max_depth: 2,
        ..Default::default()
    };
    let hierarchy = HierarchyStore::new(store.groups(), store.locations(), config);
    let org = Uuid::new_v4();

    let root = hierarchy
        .create_group(group_input(org, None, "Root"))
        .await
        .unwrap();
    let mid = hierarchy
        .create_group(group_input(org, Some(root.id), "Mid"))
        .await
        .unwrap();

    // Level 2 would equal max_depth.
    let err = hierarchy
        .create_group(group_input(org, Some(mid.id), "Too Deep"))
        .await
        .unwrap_err();

    assert!(matches!(err, RevlyError::Validation { .. }));
}

#[tokio::test]
async fn subtree_walks_transitively() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();
    let ca = hierarchy
        .create_group(group_input(org, Some(west.id), "CA"))
        .await
        .unwrap();
    let la = store
        .locations()
        .create(location_input(org, Some(ca.id), "LA Downtown"))
        .await
        .unwrap();
    let nyc = store
        .locations()
        .create(location_input(org, None, "NYC Midtown"))
        .await
        .unwrap();

    let subtree = hierarchy.get_subtree(org, west.id).await.unwrap();

    let group_ids: Vec<Uuid> = subtree.groups.iter().map(|g| g.id).collect();
    assert!(group_ids.contains(&west.id));
    assert!(group_ids.contains(&ca.id));

    let location_ids: Vec<Uuid> = subtree.locations.iter().map(|l| l.id).collect();
    assert_eq!(location_ids, vec![la.id]);
    assert!(!location_ids.contains(&nyc.id));
}

#[tokio::test]
async fn children_are_direct_only() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();
    let ca = hierarchy
        .create_group(group_input(org, Some(west.id), "CA"))
        .await
        .unwrap();
    store
        .locations()
        .create(location_input(org, Some(ca.id), "LA Downtown"))
        .await
        .unwrap();

    let (child_groups, child_locations) = hierarchy.get_children(org, west.id).await.unwrap();
    assert_eq!(child_groups.len(), 1);
    assert_eq!(child_groups[0].id, ca.id);
    // LA hangs off CA, not directly off West.
    assert!(child_locations.is_empty());
}

#[tokio::test]
async fn reparent_under_own_descendant_rejected_without_mutation() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();
    let ca = hierarchy
        .create_group(group_input(org, Some(west.id), "CA"))
        .await
        .unwrap();

    let err = hierarchy
        .reparent_group(org, west.id, Some(ca.id))
        .await
        .unwrap_err();
    assert!(matches!(err, RevlyError::Cycle { .. }));

    // Rejected before any write: the tree is untouched.
    let west_after = store.groups().get_by_id(org, west.id).await.unwrap();
    let ca_after = store.groups().get_by_id(org, ca.id).await.unwrap();
    assert_eq!(west_after.parent_group_id, None);
    assert_eq!(west_after.level, 0);
    assert_eq!(ca_after.parent_group_id, Some(west.id));
    assert_eq!(ca_after.level, 1);
}

#[tokio::test]
async fn reparent_under_self_rejected() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();

    let err = hierarchy
        .reparent_group(org, west.id, Some(west.id))
        .await
        .unwrap_err();
    assert!(matches!(err, RevlyError::Cycle { .. }));
}

#[tokio::test]
async fn reparent_recomputes_descendant_levels() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let a = hierarchy
        .create_group(group_input(org, None, "A"))
        .await
        .unwrap();
    let b = hierarchy
        .create_group(group_input(org, Some(a.id), "B"))
        .await
        .unwrap();
    let c = hierarchy
        .create_group(group_input(org, Some(b.id), "C"))
        .await
        .unwrap();

    // Promote B to a root: B 1 -> 0, C 2 -> 1.
    let releveled = hierarchy.reparent_group(org, b.id, None).await.unwrap();
    assert_eq!(releveled, 2);

    let b_after = store.groups().get_by_id(org, b.id).await.unwrap();
    let c_after = store.groups().get_by_id(org, c.id).await.unwrap();
    assert_eq!(b_after.parent_group_id, None);
    assert_eq!(b_after.level, 0);
    assert_eq!(c_after.parent_group_id, Some(b.id));
    assert_eq!(c_after.level, 1);
}

#[tokio::test]
async fn sideways_reparent_keeps_depths_and_moves_the_pointer() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();
    let east = hierarchy
        .create_group(group_input(org, None, "East"))
        .await
        .unwrap();
    let ca = hierarchy
        .create_group(group_input(org, Some(west.id), "CA"))
        .await
        .unwrap();

    hierarchy.validate_reparent(org, ca.id, Some(east.id)).await.unwrap();

    // Same depth on both sides, so no levels change.
    let releveled = hierarchy
        .reparent_group(org, ca.id, Some(east.id))
        .await
        .unwrap();
    assert_eq!(releveled, 0);

    let ca_after = store.groups().get_by_id(org, ca.id).await.unwrap();
    assert_eq!(ca_after.parent_group_id, Some(east.id));
    assert_eq!(ca_after.level, 1);
}

#[tokio::test]
async fn levels_hold_after_arbitrary_insert_and_reparent_sequence() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let r1 = hierarchy
        .create_group(group_input(org, None, "R1"))
        .await
        .unwrap();
    let r2 = hierarchy
        .create_group(group_input(org, None, "R2"))
        .await
        .unwrap();
    let a = hierarchy
        .create_group(group_input(org, Some(r1.id), "A"))
        .await
        .unwrap();
    let b = hierarchy
        .create_group(group_input(org, Some(a.id), "B"))
        .await
        .unwrap();
    let c = hierarchy
        .create_group(group_input(org, Some(b.id), "C"))
        .await
        .unwrap();

    hierarchy.reparent_group(org, a.id, Some(r2.id)).await.unwrap();
    hierarchy.reparent_group(org, c.id, Some(r1.id)).await.unwrap();
    hierarchy.reparent_group(org, b.id, None).await.unwrap();
    hierarchy.reparent_group(org, r1.id, Some(b.id)).await.unwrap();

    let groups = store.groups().list_by_organization(org).await.unwrap();
    let by_id: HashMap<Uuid, u32> = groups.iter().map(|g| (g.id, g.level)).collect();
    for group in &groups {
        match group.parent_group_id {
            None => assert_eq!(group.level, 0, "root {} must sit at level 0", group.name),
            Some(parent_id) => assert_eq!(
                group.level,
                by_id[&parent_id] + 1,
                "group {} must sit one below its parent",
                group.name
            ),
        }
    }
}

#[tokio::test]
async fn delete_refuses_nonempty_groups() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let west = hierarchy
        .create_group(group_input(org, None, "West"))
        .await
        .unwrap();
    let ca = hierarchy
        .create_group(group_input(org, Some(west.id), "CA"))
        .await
        .unwrap();
    let la = store
        .locations()
        .create(location_input(org, Some(ca.id), "LA Downtown"))
        .await
        .unwrap();

    // West still has a child group.
    let err = hierarchy.delete_group(org, west.id).await.unwrap_err();
    assert!(matches!(err, RevlyError::GroupNotEmpty { .. }));

    // CA still holds a location.
    let err = hierarchy.delete_group(org, ca.id).await.unwrap_err();
    assert!(matches!(err, RevlyError::GroupNotEmpty { .. }));

    // Empty after the location goes; deletes cascade bottom-up.
    store.locations().delete(org, la.id).await.unwrap();
    hierarchy.delete_group(org, ca.id).await.unwrap();
    hierarchy.delete_group(org, west.id).await.unwrap();

    assert!(
        store
            .groups()
            .list_by_organization(org)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn subtree_of_unknown_group_is_not_found() {
    let store = MemStore::new();
    let hierarchy = engine(&store);
    let org = Uuid::new_v4();

    let err = hierarchy.get_subtree(org, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RevlyError::NotFound { .. }));
}
