//! Revly core — shared domain models, repository traits, and the error
//! taxonomy used across all Revly crates.
//!
//! Nothing in this crate performs I/O. Storage backends implement the
//! traits in [`repository`]; services in `revly-access` are generic over
//! them.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{RevlyError, RevlyResult};
