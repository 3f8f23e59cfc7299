//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use revly_core::error::RevlyResult;
use revly_core::models::organization::{
    CreateOrganization, Organization, SubscriptionPlan, UpdateOrganization,
};
use revly_core::repository::{OrganizationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    slug: String,
    max_locations: u32,
    max_users: u32,
    plan: String,
    plan_expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    hierarchy_levels: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    slug: String,
    max_locations: u32,
    max_users: u32,
    plan: String,
    plan_expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    hierarchy_levels: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_plan(s: &str) -> Result<SubscriptionPlan, DbError> {
    match s {
        "trial" => Ok(SubscriptionPlan::Trial),
        "standard" => Ok(SubscriptionPlan::Standard),
        "enterprise" => Ok(SubscriptionPlan::Enterprise),
        other => Err(DbError::Corrupt(format!("unknown plan: {other}"))),
    }
}

fn plan_to_string(plan: SubscriptionPlan) -> &'static str {
    match plan {
        SubscriptionPlan::Trial => "trial",
        SubscriptionPlan::Standard => "standard",
        SubscriptionPlan::Enterprise => "enterprise",
    }
}

fn row_to_organization(row: OrganizationRow, id: Uuid) -> Result<Organization, DbError> {
    Ok(Organization {
        id,
        name: row.name,
        slug: row.slug,
        max_locations: row.max_locations,
        max_users: row.max_users,
        plan: parse_plan(&row.plan)?,
        plan_expires_at: row.plan_expires_at,
        is_active: row.is_active,
        hierarchy_levels: row.hierarchy_levels,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        row_to_organization(
            OrganizationRow {
                name: self.name,
                slug: self.slug,
                max_locations: self.max_locations,
                max_users: self.max_users,
                plan: self.plan,
                plan_expires_at: self.plan_expires_at,
                is_active: self.is_active,
                hierarchy_levels: self.hierarchy_levels,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> RevlyResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // New organizations always start active; deactivation is an
        // explicit update.
        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, slug = $slug, \
                 max_locations = $max_locations, max_users = $max_users, \
                 plan = $plan, plan_expires_at = $plan_expires_at, \
                 is_active = true, \
                 hierarchy_levels = $hierarchy_levels",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("max_locations", input.max_locations))
            .bind(("max_users", input.max_users))
            .bind(("plan", plan_to_string(input.plan).to_string()))
            .bind(("plan_expires_at", input.plan_expires_at))
            .bind(("hierarchy_levels", input.hierarchy_levels))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row_to_organization(row, id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RevlyResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('organization', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn get_by_slug(&self, slug: &str) -> RevlyResult<Organization> {
        let slug_owned = slug.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM organization WHERE slug = $slug",
            )
            .bind(("slug", slug_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> RevlyResult<Organization> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.max_locations.is_some() {
            sets.push("max_locations = $max_locations");
        }
        if input.max_users.is_some() {
            sets.push("max_users = $max_users");
        }
        if input.plan.is_some() {
            sets.push("plan = $plan");
        }
        if input.plan_expires_at.is_some() {
            sets.push("plan_expires_at = $plan_expires_at");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.hierarchy_levels.is_some() {
            sets.push("hierarchy_levels = $hierarchy_levels");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(max_locations) = input.max_locations {
            builder = builder.bind(("max_locations", max_locations));
        }
        if let Some(max_users) = input.max_users {
            builder = builder.bind(("max_users", max_users));
        }
        if let Some(plan) = input.plan {
            builder = builder.bind(("plan", plan_to_string(plan).to_string()));
        }
        if let Some(plan_expires_at) = input.plan_expires_at {
            // Option<Option<_>>: Some(Some(v)) = set, Some(None) = clear.
            builder = builder.bind(("plan_expires_at", plan_expires_at));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(hierarchy_levels) = input.hierarchy_levels {
            builder = builder.bind(("hierarchy_levels", hierarchy_levels));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row_to_organization(row, id)?)
    }

    async fn delete(&self, id: Uuid) -> RevlyResult<()> {
        self.db
            .query("DELETE type::record('organization', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> RevlyResult<PaginatedResult<Organization>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM organization GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM organization \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
