//! Shared in-memory fixture for the access engine tests.
//!
//! [`MemStore`] holds one organization-agnostic state behind a lock
//! and hands out repository handles ([`MemStore::groups`],
//! [`MemStore::locations`], [`MemStore::grants`]) implementing the
//! `revly-core` traits, so a test can mutate store state underneath a
//! running engine the way administrative writes would in production.
//! Failure and latency injection cover the deny-on-error and timeout
//! paths.
#![allow(dead_code)] // each test binary compiles its own copy; none uses every helper

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use revly_core::error::{RevlyError, RevlyResult};
use revly_core::models::grant::{AccessGrant, CreateAccessGrant};
use revly_core::models::location::{CreateLocation, Location, UpdateLocation};
use revly_core::models::location_group::{
    CreateLocationGroup, LocationGroup, UpdateLocationGroup,
};
use revly_core::repository::{
    GrantRepository, LocationGroupRepository, LocationRepository, PaginatedResult, Pagination,
};
use uuid::Uuid;

#[derive(Default)]
struct MemState {
    groups: HashMap<Uuid, LocationGroup>,
    locations: HashMap<Uuid, Location>,
    grants: HashMap<Uuid, AccessGrant>,
    fail: bool,
    latency: Option<Duration>,
}

type Shared = Arc<Mutex<MemState>>;

/// Applied at the top of every repository call: injected latency
/// first, then the failure switch.
async fn guard(state: &Shared) -> RevlyResult<()> {
    let (fail, latency) = {
        let state = state.lock().unwrap();
        (state.fail, state.latency)
    };
    if let Some(latency) = latency {
        tokio::time::sleep(latency).await;
    }
    if fail {
        return Err(RevlyError::StoreUnavailable("fixture store failing".into()));
    }
    Ok(())
}

fn not_found(entity: &str, id: Uuid) -> RevlyError {
    RevlyError::NotFound {
        entity: entity.into(),
        id: id.to_string(),
    }
}

/// In-memory store hub. Handles from one hub share state.
#[derive(Clone, Default)]
pub struct MemStore {
    state: Shared,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> MemGroupRepo {
        MemGroupRepo {
            state: self.state.clone(),
        }
    }

    pub fn locations(&self) -> MemLocationRepo {
        MemLocationRepo {
            state: self.state.clone(),
        }
    }

    pub fn grants(&self) -> MemGrantRepo {
        MemGrantRepo {
            state: self.state.clone(),
        }
    }

    /// Make every subsequent repository call fail with
    /// `StoreUnavailable`.
    pub fn set_failing(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }

    /// Delay every repository call by the given duration.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().unwrap().latency = latency;
    }
}

#[derive(Clone)]
pub struct MemGroupRepo {
    state: Shared,
}

impl LocationGroupRepository for MemGroupRepo {
    async fn create(&self, input: CreateLocationGroup, level: u32) -> RevlyResult<LocationGroup> {
        guard(&self.state).await?;
        let now = Utc::now();
        let group = LocationGroup {
            id: Uuid::new_v4(),
            organization_id: input.organization_id,
            parent_group_id: input.parent_group_id,
            name: input.name,
            group_type: input.group_type,
            level,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .groups
            .insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<LocationGroup> {
        guard(&self.state).await?;
        self.state
            .lock()
            .unwrap()
            .groups
            .get(&id)
            .filter(|g| g.organization_id == organization_id)
            .cloned()
            .ok_or_else(|| not_found("location_group", id))
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> RevlyResult<Vec<LocationGroup>> {
        guard(&self.state).await?;
        let mut groups: Vec<LocationGroup> = self
            .state
            .lock()
            .unwrap()
            .groups
            .values()
            .filter(|g| g.organization_id == organization_id)
            .cloned()
            .collect();
        groups.sort_by_key(|g| (g.created_at, g.id));
        Ok(groups)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocationGroup,
    ) -> RevlyResult<LocationGroup> {
        guard(&self.state).await?;
        let mut state = self.state.lock().unwrap();
        let group = state
            .groups
            .get_mut(&id)
            .filter(|g| g.organization_id == organization_id)
            .ok_or_else(|| not_found("location_group", id))?;
        if let Some(name) = input.name {
            group.name = name;
        }
        if let Some(group_type) = input.group_type {
            group.group_type = group_type;
        }
        group.updated_at = Utc::now();
        Ok(group.clone())
    }

    async fn reparent(
        &self,
        organization_id: Uuid,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        levels: Vec<(Uuid, u32)>,
    ) -> RevlyResult<()> {
        guard(&self.state).await?;
        let mut state = self.state.lock().unwrap();
        let group = state
            .groups
            .get_mut(&id)
            .filter(|g| g.organization_id == organization_id)
            .ok_or_else(|| not_found("location_group", id))?;
        group.parent_group_id = new_parent_id;
        group.updated_at = Utc::now();
        for (group_id, level) in levels {
            if let Some(group) = state.groups.get_mut(&group_id) {
                group.level = level;
                group.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<()> {
        guard(&self.state).await?;
        let mut state = self.state.lock().unwrap();
        if state
            .groups
            .get(&id)
            .is_some_and(|g| g.organization_id == organization_id)
        {
            state.groups.remove(&id);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemLocationRepo {
    state: Shared,
}

impl LocationRepository for MemLocationRepo {
    async fn create(&self, input: CreateLocation) -> RevlyResult<Location> {
        guard(&self.state).await?;
        let now = Utc::now();
        let location = Location {
            id: Uuid::new_v4(),
            organization_id: input.organization_id,
            location_group_id: input.location_group_id,
            name: input.name,
            address: input.address,
            city: input.city,
            region: input.region,
            postal_code: input.postal_code,
            country: input.country,
            phone: input.phone,
            manager_user_id: input.manager_user_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .locations
            .insert(location.id, location.clone());
        Ok(location)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<Location> {
        guard(&self.state).await?;
        self.state
            .lock()
            .unwrap()
            .locations
            .get(&id)
            .filter(|l| l.organization_id == organization_id)
            .cloned()
            .ok_or_else(|| not_found("location", id))
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> RevlyResult<Vec<Location>> {
        guard(&self.state).await?;
        let mut locations: Vec<Location> = self
            .state
            .lock()
            .unwrap()
            .locations
            .values()
            .filter(|l| l.organization_id == organization_id)
            .cloned()
            .collect();
        locations.sort_by_key(|l| (l.created_at, l.id));
        Ok(locations)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocation,
    ) -> RevlyResult<Location> {
        guard(&self.state).await?;
        let mut state = self.state.lock().unwrap();
        let location = state
            .locations
            .get_mut(&id)
            .filter(|l| l.organization_id == organization_id)
            .ok_or_else(|| not_found("location", id))?;
        if let Some(name) = input.name {
            location.name = name;
        }
        if let Some(address) = input.address {
            location.address = address;
        }
        if let Some(city) = input.city {
            location.city = city;
        }
        if let Some(region) = input.region {
            location.region = region;
        }
        if let Some(postal_code) = input.postal_code {
            location.postal_code = postal_code;
        }
        if let Some(country) = input.country {
            location.country = country;
        }
        if let Some(phone) = input.phone {
            location.phone = phone;
        }
        if let Some(location_group_id) = input.location_group_id {
            location.location_group_id = location_group_id;
        }
        if let Some(manager_user_id) = input.manager_user_id {
            location.manager_user_id = manager_user_id;
        }
        if let Some(is_active) = input.is_active {
            location.is_active = is_active;
        }
        location.updated_at = Utc::now();
        Ok(location.clone())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<()> {
        guard(&self.state).await?;
        let mut state = self.state.lock().unwrap();
        if state
            .locations
            .get(&id)
            .is_some_and(|l| l.organization_id == organization_id)
        {
            state.locations.remove(&id);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MemGrantRepo {
    state: Shared,
}

impl GrantRepository for MemGrantRepo {
    async fn create(&self, input: CreateAccessGrant) -> RevlyResult<AccessGrant> {
        guard(&self.state).await?;
        let grant = AccessGrant {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            organization_id: input.organization_id,
            scope: input.scope,
            permissions: input.permissions,
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .grants
            .insert(grant.id, grant.clone());
        Ok(grant)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<AccessGrant> {
        guard(&self.state).await?;
        self.state
            .lock()
            .unwrap()
            .grants
            .get(&id)
            .filter(|g| g.organization_id == organization_id)
            .cloned()
            .ok_or_else(|| not_found("access_grant", id))
    }

    async fn list_by_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RevlyResult<Vec<AccessGrant>> {
        guard(&self.state).await?;
        let mut grants: Vec<AccessGrant> = self
            .state
            .lock()
            .unwrap()
            .grants
            .values()
            .filter(|g| g.organization_id == organization_id && g.user_id == user_id)
            .cloned()
            .collect();
        grants.sort_by_key(|g| (g.created_at, g.id));
        Ok(grants)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> RevlyResult<PaginatedResult<AccessGrant>> {
        guard(&self.state).await?;
        let mut grants: Vec<AccessGrant> = self
            .state
            .lock()
            .unwrap()
            .grants
            .values()
            .filter(|g| g.organization_id == organization_id)
            .cloned()
            .collect();
        grants.sort_by_key(|g| (g.created_at, g.id));
        let total = grants.len() as u64;
        let items = grants
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();
        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<()> {
        guard(&self.state).await?;
        let mut state = self.state.lock().unwrap();
        if state
            .grants
            .get(&id)
            .is_some_and(|g| g.organization_id == organization_id)
        {
            state.grants.remove(&id);
        }
        Ok(())
    }
}

/// Convenience input builders; every field tests do not care about
/// gets a fixed value.
pub fn group_input(
    organization_id: Uuid,
    parent_group_id: Option<Uuid>,
    name: &str,
) -> CreateLocationGroup {
    CreateLocationGroup {
        organization_id,
        parent_group_id,
        name: name.into(),
        group_type: "Region".into(),
    }
}

pub fn location_input(
    organization_id: Uuid,
    location_group_id: Option<Uuid>,
    name: &str,
) -> CreateLocation {
    CreateLocation {
        organization_id,
        location_group_id,
        name: name.into(),
        address: "1 Main St".into(),
        city: "Springfield".into(),
        region: "IL".into(),
        postal_code: "62701".into(),
        country: "US".into(),
        phone: None,
        manager_user_id: None,
    }
}
