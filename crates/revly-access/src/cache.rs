//! Resolution cache with per-organization version counters.
//!
//! Entries are keyed by `(user_id, organization_id)`. Correctness
//! under concurrent writes comes from one monotonic counter per
//! organization:
//!
//! - a hit is only served when the entry was computed at the current
//!   counter value (and, when configured, is younger than the TTL);
//! - `invalidate` bumps the counter before sweeping entries, so a
//!   resolve that starts after invalidation returns can never observe
//!   a pre-invalidation value;
//! - a computed result is only published if the counter did not move
//!   during computation. A racing invalidation turns the publish into
//!   a no-op; the caller still gets its freshly computed result.
//!
//! Two concurrent misses on the same key may both compute. That
//! duplication is accepted; the last publish wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use revly_core::error::{RevlyError, RevlyResult};
use tracing::debug;
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::resolver::{ResolveAccess, ResolvedAccess};

struct CacheEntry {
    access: Arc<ResolvedAccess>,
    /// Organization counter value the entry was computed at.
    org_version: u64,
    inserted_at: Instant,
}

pub struct AccessCache<R: ResolveAccess> {
    inner: R,
    entries: DashMap<(Uuid, Uuid), CacheEntry>,
    versions: DashMap<Uuid, Arc<AtomicU64>>,
    config: AccessConfig,
}

impl<R: ResolveAccess> AccessCache<R> {
    pub fn new(inner: R, config: AccessConfig) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            versions: DashMap::new(),
            config,
        }
    }

    fn version_handle(&self, organization_id: Uuid) -> Arc<AtomicU64> {
        self.versions
            .entry(organization_id)
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone()
    }

    fn expired(&self, entry: &CacheEntry) -> bool {
        self.config
            .entry_ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    /// Drop every cached entry for the organization. Readers that
    /// start after this returns recompute against fresh store state.
    pub fn invalidate(&self, organization_id: Uuid) {
        // Counter first: in-flight computations that read the old
        // value will fail their publish check even if they finish
        // after the sweep.
        let version = self.version_handle(organization_id);
        let bumped = version.fetch_add(1, Ordering::AcqRel) + 1;
        self.entries
            .retain(|(_, org), _| *org != organization_id);
        debug!(%organization_id, version = bumped, "invalidated cached access for organization");
    }
}

impl<R: ResolveAccess> ResolveAccess for AccessCache<R> {
    async fn resolve(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> RevlyResult<Arc<ResolvedAccess>> {
        let version = self.version_handle(organization_id);
        let observed = version.load(Ordering::Acquire);
        let key = (user_id, organization_id);

        if let Some(entry) = self.entries.get(&key) {
            if entry.org_version == observed && !self.expired(&entry) {
                return Ok(entry.access.clone());
            }
        }

        // Compute outside any map guard. The store load is bounded;
        // a timeout is an error the gate turns into a denial.
        let access = tokio::time::timeout(
            self.config.resolve_timeout,
            self.inner.resolve(user_id, organization_id),
        )
        .await
        .map_err(|_| RevlyError::Timeout)??;

        // Publish only if no invalidation raced the computation.
        if version.load(Ordering::Acquire) == observed {
            self.entries.insert(
                key,
                CacheEntry {
                    access: access.clone(),
                    org_version: observed,
                    inserted_at: Instant::now(),
                },
            );
        }

        Ok(access)
    }
}
