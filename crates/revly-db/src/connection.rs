//! Connection handling for the SurrealDB backend.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

/// Connection settings for the SurrealDB backend.
///
/// The defaults point at a local `surreal start` instance; deployments
/// override them through [`DbConfig::from_env`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint, host and port only (e.g. `127.0.0.1:8000`).
    pub url: String,
    /// Namespace to select after signing in.
    pub namespace: String,
    /// Database to select within the namespace.
    pub database: String,
    /// Root-level username.
    pub username: String,
    /// Root-level password.
    pub password: String,
}

impl DbConfig {
    /// Read the `REVLY_DB_*` environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REVLY_DB_URL").unwrap_or(defaults.url),
            namespace: std::env::var("REVLY_DB_NAMESPACE").unwrap_or(defaults.namespace),
            database: std::env::var("REVLY_DB_DATABASE").unwrap_or(defaults.database),
            username: std::env::var("REVLY_DB_USERNAME").unwrap_or(defaults.username),
            password: std::env::var("REVLY_DB_PASSWORD").unwrap_or(defaults.password),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "revly".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// A signed-in SurrealDB client with its namespace and database
/// selected.
///
/// Cloning is cheap; the underlying client is shareable across tasks.
#[derive(Clone)]
pub struct DbManager {
    client: Surreal<Client>,
}

impl DbManager {
    /// Open a WebSocket connection, authenticate as root, and select
    /// the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(url = %config.url, "Opening SurrealDB connection");

        let client = Surreal::new::<Ws>(&config.url).await?;

        client
            .signin(Root {
                username: config.username.clone(),
                password: config.password.clone(),
            })
            .await?;

        client
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(
            namespace = %config.namespace,
            database = %config.database,
            "SurrealDB connection ready"
        );

        Ok(Self { client })
    }

    /// The underlying client handle.
    pub fn client(&self) -> &Surreal<Client> {
        &self.client
    }
}
