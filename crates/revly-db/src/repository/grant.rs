//! SurrealDB implementation of [`GrantRepository`].
//!
//! The three scope shapes are one `scope_kind` column plus two option
//! columns on disk. The converters enforce exclusivity both ways: a
//! row whose columns contradict its kind is surfaced as corrupt, never
//! silently coerced into a grant.

use chrono::{DateTime, Utc};
use revly_core::error::RevlyResult;
use revly_core::models::grant::{
    AccessGrant, AccessScope, CreateAccessGrant, Permission, PermissionSet,
};
use revly_core::repository::{GrantRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct GrantRow {
    organization_id: String,
    user_id: String,
    scope_kind: String,
    location_id: Option<String>,
    location_group_id: Option<String>,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct GrantRowWithId {
    record_id: String,
    organization_id: String,
    user_id: String,
    scope_kind: String,
    location_id: Option<String>,
    location_group_id: Option<String>,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_permission(s: &str) -> Result<Permission, DbError> {
    match s {
        "view" => Ok(Permission::View),
        "edit" => Ok(Permission::Edit),
        "respond" => Ok(Permission::Respond),
        "manage" => Ok(Permission::Manage),
        other => Err(DbError::Corrupt(format!("unknown permission: {other}"))),
    }
}

fn permission_to_string(permission: Permission) -> &'static str {
    match permission {
        Permission::View => "view",
        Permission::Edit => "edit",
        Permission::Respond => "respond",
        Permission::Manage => "manage",
    }
}

fn scope_to_columns(scope: AccessScope) -> (&'static str, Option<String>, Option<String>) {
    match scope {
        AccessScope::AllLocations => ("all_locations", None, None),
        AccessScope::Location(id) => ("location", Some(id.to_string()), None),
        AccessScope::Group(id) => ("group", None, Some(id.to_string())),
    }
}

fn scope_from_columns(
    kind: &str,
    location_id: Option<String>,
    location_group_id: Option<String>,
) -> Result<AccessScope, DbError> {
    match (kind, location_id, location_group_id) {
        ("all_locations", None, None) => Ok(AccessScope::AllLocations),
        ("location", Some(l), None) => {
            let id = Uuid::parse_str(&l)
                .map_err(|e| DbError::Corrupt(format!("invalid location UUID: {e}")))?;
            Ok(AccessScope::Location(id))
        }
        ("group", None, Some(g)) => {
            let id = Uuid::parse_str(&g)
                .map_err(|e| DbError::Corrupt(format!("invalid group UUID: {e}")))?;
            Ok(AccessScope::Group(id))
        }
        (kind, location_id, location_group_id) => Err(DbError::Corrupt(format!(
            "grant scope columns inconsistent: kind={kind}, \
             location_id={location_id:?}, location_group_id={location_group_id:?}"
        ))),
    }
}

fn row_to_grant(row: GrantRow, id: Uuid) -> Result<AccessGrant, DbError> {
    let organization_id = Uuid::parse_str(&row.organization_id)
        .map_err(|e| DbError::Corrupt(format!("invalid organization UUID: {e}")))?;
    let user_id = Uuid::parse_str(&row.user_id)
        .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
    let scope = scope_from_columns(&row.scope_kind, row.location_id, row.location_group_id)?;
    let permissions = row
        .permissions
        .iter()
        .map(|p| parse_permission(p))
        .collect::<Result<PermissionSet, DbError>>()?;
    Ok(AccessGrant {
        id,
        user_id,
        organization_id,
        scope,
        permissions,
        created_at: row.created_at,
    })
}

impl GrantRowWithId {
    fn try_into_grant(self) -> Result<AccessGrant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        row_to_grant(
            GrantRow {
                organization_id: self.organization_id,
                user_id: self.user_id,
                scope_kind: self.scope_kind,
                location_id: self.location_id,
                location_group_id: self.location_group_id,
                permissions: self.permissions,
                created_at: self.created_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Grant repository.
#[derive(Clone)]
pub struct SurrealGrantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGrantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GrantRepository for SurrealGrantRepository<C> {
    async fn create(&self, input: CreateAccessGrant) -> RevlyResult<AccessGrant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let (scope_kind, location_id, location_group_id) = scope_to_columns(input.scope);
        let permissions: Vec<String> = input
            .permissions
            .iter()
            .map(|p| permission_to_string(p).to_string())
            .collect();

        let result = self
            .db
            .query(
                "CREATE type::record('access_grant', $id) SET \
                 organization_id = $organization_id, \
                 user_id = $user_id, \
                 scope_kind = $scope_kind, \
                 location_id = $location_id, \
                 location_group_id = $location_group_id, \
                 permissions = $permissions",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("scope_kind", scope_kind.to_string()))
            .bind(("location_id", location_id))
            .bind(("location_group_id", location_group_id))
            .bind(("permissions", permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "access_grant".into(),
            id: id_str,
        })?;

        Ok(row_to_grant(row, id)?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<AccessGrant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('access_grant', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "access_grant".into(),
            id: id_str,
        })?;

        Ok(row_to_grant(row, id)?)
    }

    async fn list_by_user(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> RevlyResult<Vec<AccessGrant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM access_grant \
                 WHERE organization_id = $organization_id \
                 AND user_id = $user_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_grant())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> RevlyResult<PaginatedResult<AccessGrant>> {
        let organization_id_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM access_grant \
                 WHERE organization_id = $organization_id GROUP ALL",
            )
            .bind(("organization_id", organization_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM access_grant \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", organization_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_grant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<()> {
        self.db
            .query(
                "DELETE type::record('access_grant', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
