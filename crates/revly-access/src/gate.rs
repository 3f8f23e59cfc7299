//! Authorization gate — the boolean check request handlers call.
//!
//! Fails closed: any resolution failure (store unavailable, timeout,
//! corrupt hierarchy) is a denial, never a grant.

use revly_core::models::grant::Permission;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::resolver::ResolveAccess;

pub struct AuthorizationGate<R: ResolveAccess> {
    resolver: R,
}

impl<R: ResolveAccess> AuthorizationGate<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// True iff the user's resolved access covers the location and the
    /// merged permission set allows the action.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        location_id: Uuid,
        permission: Permission,
    ) -> bool {
        match self.resolver.resolve(user_id, organization_id).await {
            Ok(access) => {
                let allowed = access.can(location_id, permission);
                if !allowed {
                    debug!(
                        %user_id,
                        %organization_id,
                        %location_id,
                        ?permission,
                        "authorization denied"
                    );
                }
                allowed
            }
            Err(err) => {
                warn!(
                    %user_id,
                    %organization_id,
                    %location_id,
                    error = %err,
                    "authorization denied: resolution failed"
                );
                false
            }
        }
    }

    /// Every location the user can see, for listing surfaces. Empty on
    /// resolution failure, consistent with the deny-on-error rule.
    pub async fn visible_locations(&self, user_id: Uuid, organization_id: Uuid) -> Vec<Uuid> {
        match self.resolver.resolve(user_id, organization_id).await {
            Ok(access) => access.location_ids(),
            Err(err) => {
                warn!(
                    %user_id,
                    %organization_id,
                    error = %err,
                    "listing denied: resolution failed"
                );
                Vec::new()
            }
        }
    }
}
