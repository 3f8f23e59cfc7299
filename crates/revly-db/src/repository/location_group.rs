//! SurrealDB implementation of [`LocationGroupRepository`].

use chrono::{DateTime, Utc};
use revly_core::error::RevlyResult;
use revly_core::models::location_group::{
    CreateLocationGroup, LocationGroup, UpdateLocationGroup,
};
use revly_core::repository::LocationGroupRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LocationGroupRow {
    organization_id: String,
    parent_group_id: Option<String>,
    name: String,
    group_type: String,
    level: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct LocationGroupRowWithId {
    record_id: String,
    organization_id: String,
    parent_group_id: Option<String>,
    name: String,
    group_type: String,
    level: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_group(row: LocationGroupRow, id: Uuid) -> Result<LocationGroup, DbError> {
    let organization_id = Uuid::parse_str(&row.organization_id)
        .map_err(|e| DbError::Corrupt(format!("invalid organization UUID: {e}")))?;
    let parent_group_id = row
        .parent_group_id
        .map(|p| Uuid::parse_str(&p))
        .transpose()
        .map_err(|e| DbError::Corrupt(format!("invalid parent UUID: {e}")))?;
    Ok(LocationGroup {
        id,
        organization_id,
        parent_group_id,
        name: row.name,
        group_type: row.group_type,
        level: row.level,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl LocationGroupRowWithId {
    fn try_into_group(self) -> Result<LocationGroup, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        row_to_group(
            LocationGroupRow {
                organization_id: self.organization_id,
                parent_group_id: self.parent_group_id,
                name: self.name,
                group_type: self.group_type,
                level: self.level,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the LocationGroup repository.
#[derive(Clone)]
pub struct SurrealLocationGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLocationGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LocationGroupRepository for SurrealLocationGroupRepository<C> {
    async fn create(&self, input: CreateLocationGroup, level: u32) -> RevlyResult<LocationGroup> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('location_group', $id) SET \
                 organization_id = $organization_id, \
                 parent_group_id = $parent_group_id, \
                 name = $name, group_type = $group_type, \
                 level = $level",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("parent_group_id", input.parent_group_id.map(|p| p.to_string())))
            .bind(("name", input.name))
            .bind(("group_type", input.group_type))
            .bind(("level", level))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<LocationGroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location_group".into(),
            id: id_str,
        })?;

        Ok(row_to_group(row, id)?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<LocationGroup> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('location_group', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LocationGroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location_group".into(),
            id: id_str,
        })?;

        Ok(row_to_group(row, id)?)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> RevlyResult<Vec<LocationGroup>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM location_group \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LocationGroupRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_group())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocationGroup,
    ) -> RevlyResult<LocationGroup> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.group_type.is_some() {
            sets.push("group_type = $group_type");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('location_group', $id) SET {} \
             WHERE organization_id = $organization_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(group_type) = input.group_type {
            builder = builder.bind(("group_type", group_type));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<LocationGroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location_group".into(),
            id: id_str,
        })?;

        Ok(row_to_group(row, id)?)
    }

    async fn reparent(
        &self,
        organization_id: Uuid,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        levels: Vec<(Uuid, u32)>,
    ) -> RevlyResult<()> {
        let id_str = id.to_string();

        // Parent change and level rewrites commit atomically so readers
        // never observe a half-moved subtree. Record IDs are inlined
        // (UUIDs are hex and dashes only); scalars stay as binds.
        let mut query = String::from("BEGIN TRANSACTION; ");
        query.push_str(
            "UPDATE type::record('location_group', $id) SET \
             parent_group_id = $new_parent_id, updated_at = time::now() \
             WHERE organization_id = $organization_id; ",
        );
        for (group_id, level) in &levels {
            query.push_str(&format!(
                "UPDATE type::record('location_group', '{group_id}') SET \
                 level = {level}, updated_at = time::now() \
                 WHERE organization_id = $organization_id; "
            ));
        }
        query.push_str("COMMIT TRANSACTION;");

        let result = self
            .db
            .query(query)
            .bind(("id", id_str))
            .bind(("new_parent_id", new_parent_id.map(|p| p.to_string())))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<()> {
        self.db
            .query(
                "DELETE type::record('location_group', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
