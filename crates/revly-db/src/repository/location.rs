//! SurrealDB implementation of [`LocationRepository`].

use chrono::{DateTime, Utc};
use revly_core::error::RevlyResult;
use revly_core::models::location::{CreateLocation, Location, UpdateLocation};
use revly_core::repository::LocationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LocationRow {
    organization_id: String,
    location_group_id: Option<String>,
    name: String,
    address: String,
    city: String,
    region: String,
    postal_code: String,
    country: String,
    phone: Option<String>,
    manager_user_id: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct LocationRowWithId {
    record_id: String,
    organization_id: String,
    location_group_id: Option<String>,
    name: String,
    address: String,
    city: String,
    region: String,
    postal_code: String,
    country: String,
    phone: Option<String>,
    manager_user_id: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_opt_uuid(value: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    value
        .map(|v| Uuid::parse_str(&v))
        .transpose()
        .map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
}

fn row_to_location(row: LocationRow, id: Uuid) -> Result<Location, DbError> {
    let organization_id = Uuid::parse_str(&row.organization_id)
        .map_err(|e| DbError::Corrupt(format!("invalid organization UUID: {e}")))?;
    Ok(Location {
        id,
        organization_id,
        location_group_id: parse_opt_uuid(row.location_group_id, "group")?,
        name: row.name,
        address: row.address,
        city: row.city,
        region: row.region,
        postal_code: row.postal_code,
        country: row.country,
        phone: row.phone,
        manager_user_id: parse_opt_uuid(row.manager_user_id, "manager")?,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl LocationRowWithId {
    fn try_into_location(self) -> Result<Location, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        row_to_location(
            LocationRow {
                organization_id: self.organization_id,
                location_group_id: self.location_group_id,
                name: self.name,
                address: self.address,
                city: self.city,
                region: self.region,
                postal_code: self.postal_code,
                country: self.country,
                phone: self.phone,
                manager_user_id: self.manager_user_id,
                is_active: self.is_active,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Location repository.
#[derive(Clone)]
pub struct SurrealLocationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLocationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LocationRepository for SurrealLocationRepository<C> {
    async fn create(&self, input: CreateLocation) -> RevlyResult<Location> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('location', $id) SET \
                 organization_id = $organization_id, \
                 location_group_id = $location_group_id, \
                 name = $name, address = $address, city = $city, \
                 region = $region, postal_code = $postal_code, \
                 country = $country, phone = $phone, \
                 manager_user_id = $manager_user_id, \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind((
                "location_group_id",
                input.location_group_id.map(|g| g.to_string()),
            ))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .bind(("city", input.city))
            .bind(("region", input.region))
            .bind(("postal_code", input.postal_code))
            .bind(("country", input.country))
            .bind(("phone", input.phone))
            .bind((
                "manager_user_id",
                input.manager_user_id.map(|m| m.to_string()),
            ))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<LocationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location".into(),
            id: id_str,
        })?;

        Ok(row_to_location(row, id)?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<Location> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('location', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LocationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location".into(),
            id: id_str,
        })?;

        Ok(row_to_location(row, id)?)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> RevlyResult<Vec<Location>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM location \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LocationRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .map(|row| row.try_into_location())
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocation,
    ) -> RevlyResult<Location> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if input.city.is_some() {
            sets.push("city = $city");
        }
        if input.region.is_some() {
            sets.push("region = $region");
        }
        if input.postal_code.is_some() {
            sets.push("postal_code = $postal_code");
        }
        if input.country.is_some() {
            sets.push("country = $country");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.location_group_id.is_some() {
            sets.push("location_group_id = $location_group_id");
        }
        if input.manager_user_id.is_some() {
            sets.push("manager_user_id = $manager_user_id");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('location', $id) SET {} \
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
        if let Some(address) = input.address {
            builder = builder.bind(("address", address));
        }
        if let Some(city) = input.city {
            builder = builder.bind(("city", city));
        }
        if let Some(region) = input.region {
            builder = builder.bind(("region", region));
        }
        if let Some(postal_code) = input.postal_code {
            builder = builder.bind(("postal_code", postal_code));
        }
        if let Some(country) = input.country {
            builder = builder.bind(("country", country));
        }
        if let Some(phone) = input.phone {
            // Option<Option<_>>: Some(Some(v)) = set, Some(None) = clear.
            builder = builder.bind(("phone", phone));
        }
        if let Some(location_group_id) = input.location_group_id {
            builder = builder.bind((
                "location_group_id",
                location_group_id.map(|g| g.to_string()),
            ));
        }
        if let Some(manager_user_id) = input.manager_user_id {
            builder = builder.bind((
                "manager_user_id",
                manager_user_id.map(|m| m.to_string()),
            ));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<LocationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location".into(),
            id: id_str,
        })?;

        Ok(row_to_location(row, id)?)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> RevlyResult<()> {
        self.db
            .query(
                "DELETE type::record('location', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
