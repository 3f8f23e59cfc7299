//! SurrealDB persistence for Revly.
//!
//! Everything above this crate talks to the `revly-core` repository
//! traits; this crate supplies the SurrealDB-backed implementations of
//! those traits, the schema they rely on, and the connection plumbing
//! around them.

mod connection;
mod error;
mod schema;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
