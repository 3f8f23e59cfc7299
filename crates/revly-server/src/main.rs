//! Revly Server — application entry point.

use std::sync::Arc;

use revly_access::{AccessCache, AccessConfig, AccessResolver, AuthorizationGate, HierarchyStore};
use revly_db::repository::{
    SurrealGrantRepository, SurrealLocationGroupRepository, SurrealLocationRepository,
};
use revly_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("revly=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting Revly server...");

    let db_config = DbConfig::from_env();
    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = revly_db::run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let db = manager.client().clone();
    let access_config = AccessConfig::default();
    let hierarchy = HierarchyStore::new(
        SurrealLocationGroupRepository::new(db.clone()),
        SurrealLocationRepository::new(db.clone()),
        access_config.clone(),
    );
    let resolver = AccessResolver::new(hierarchy, SurrealGrantRepository::new(db));
    // The request layer gets the gate for checks and keeps the cache
    // handle for invalidation on administrative writes.
    let cache = Arc::new(AccessCache::new(resolver, access_config));
    let _gate = AuthorizationGate::new(Arc::clone(&cache));

    tracing::info!("Access engine assembled; ready for requests");

    // TODO: Start REST API server

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("Revly server stopped.");
}
