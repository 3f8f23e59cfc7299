//! SurrealDB table definitions and the migration runner.
//!
//! Every table is SCHEMAFULL. Identifiers are UUID strings, and
//! enum-like fields carry ASSERT lists so a bad write fails at the
//! database instead of surfacing later as a corrupt read.

use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

// Bootstrapped on every start, so each statement must tolerate already
// existing.
const TRACKING_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

struct Migration {
    version: u32,
    name: &'static str,
    ddl: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    ddl: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (global scope)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD slug ON TABLE organization TYPE string;
DEFINE FIELD max_locations ON TABLE organization TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD max_users ON TABLE organization TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD plan ON TABLE organization TYPE string \
    ASSERT $value IN ['trial', 'standard', 'enterprise'];
DEFINE FIELD plan_expires_at ON TABLE organization \
    TYPE option<datetime>;
DEFINE FIELD is_active ON TABLE organization TYPE bool DEFAULT true;
DEFINE FIELD hierarchy_levels ON TABLE organization TYPE array;
DEFINE FIELD hierarchy_levels.* ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_slug ON TABLE organization \
    COLUMNS slug UNIQUE;

-- =======================================================================
-- Location groups (organization scope, hierarchical)
-- =======================================================================
DEFINE TABLE location_group SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE location_group TYPE string;
DEFINE FIELD parent_group_id ON TABLE location_group \
    TYPE option<string>;
DEFINE FIELD name ON TABLE location_group TYPE string;
DEFINE FIELD group_type ON TABLE location_group TYPE string;
DEFINE FIELD level ON TABLE location_group TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD created_at ON TABLE location_group TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE location_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_location_group_org ON TABLE location_group \
    COLUMNS organization_id;
DEFINE INDEX idx_location_group_parent ON TABLE location_group \
    COLUMNS organization_id, parent_group_id;

-- =======================================================================
-- Locations (organization scope)
-- =======================================================================
DEFINE TABLE location SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE location TYPE string;
DEFINE FIELD location_group_id ON TABLE location TYPE option<string>;
DEFINE FIELD name ON TABLE location TYPE string;
DEFINE FIELD address ON TABLE location TYPE string;
DEFINE FIELD city ON TABLE location TYPE string;
DEFINE FIELD region ON TABLE location TYPE string;
DEFINE FIELD postal_code ON TABLE location TYPE string;
DEFINE FIELD country ON TABLE location TYPE string;
DEFINE FIELD phone ON TABLE location TYPE option<string>;
DEFINE FIELD manager_user_id ON TABLE location TYPE option<string>;
DEFINE FIELD is_active ON TABLE location TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE location TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE location TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_location_org ON TABLE location \
    COLUMNS organization_id;
DEFINE INDEX idx_location_group ON TABLE location \
    COLUMNS organization_id, location_group_id;

-- =======================================================================
-- Access grants (organization scope, immutable once issued)
-- =======================================================================
DEFINE TABLE access_grant SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE access_grant TYPE string;
DEFINE FIELD user_id ON TABLE access_grant TYPE string;
DEFINE FIELD scope_kind ON TABLE access_grant TYPE string \
    ASSERT $value IN ['all_locations', 'location', 'group'];
DEFINE FIELD location_id ON TABLE access_grant TYPE option<string>;
DEFINE FIELD location_group_id ON TABLE access_grant \
    TYPE option<string>;
DEFINE FIELD permissions ON TABLE access_grant TYPE array;
DEFINE FIELD permissions.* ON TABLE access_grant TYPE string \
    ASSERT $value IN ['view', 'edit', 'respond', 'manage'];
DEFINE FIELD created_at ON TABLE access_grant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_access_grant_org_user ON TABLE access_grant \
    COLUMNS organization_id, user_id;
";

// -----------------------------------------------------------------------
// Runner
// -----------------------------------------------------------------------

/// Apply any schema migrations this database has not seen yet.
///
/// Bootstraps the `_migration` tracking table, reads the highest
/// applied version, and applies newer entries in order. Intended to run
/// on every startup; a database that is already current is a no-op.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(TRACKING_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("tracking table bootstrap failed: {e}")))?;

    let mut result = db.query("SELECT VALUE version FROM _migration").await?;
    let applied: Vec<u32> = result.take(0)?;
    let current = applied.into_iter().max().unwrap_or(0);

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| m.version > current)
        .collect();
    if pending.is_empty() {
        info!(version = current, "Schema is up to date");
        return Ok(());
    }

    for migration in pending {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying schema migration"
        );
        db.query(migration.ddl).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "migration v{} ({}) did not apply cleanly: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record migration v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    info!("Schema migrations complete");
    Ok(())
}
