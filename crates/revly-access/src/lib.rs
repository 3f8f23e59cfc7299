//! Revly Access — resolution of "which locations can this user act on,
//! and with which permissions?".
//!
//! The crate is layered bottom-up:
//! - [`index`]: a pure in-memory snapshot of one organization's group
//!   tree with explicit graph algorithms (subtree, ancestors, cycle
//!   validation, level recomputation).
//! - [`hierarchy`]: the write-side integrity layer over the group and
//!   location repositories.
//! - [`resolver`]: turns a user's grants into a location-to-permissions
//!   map.
//! - [`cache`]: per-(user, organization) memoization with per-org
//!   version counters for linearizable invalidation.
//! - [`gate`]: the fail-closed boolean entry point request handlers
//!   call.
//!
//! Everything is generic over the `revly-core` repository traits, so
//! the crate has no dependency on the database crate.

pub mod cache;
pub mod config;
pub mod error;
pub mod gate;
pub mod hierarchy;
pub mod index;
pub mod resolver;

pub use cache::AccessCache;
pub use config::AccessConfig;
pub use error::AccessError;
pub use gate::AuthorizationGate;
pub use hierarchy::HierarchyStore;
pub use index::{HierarchyIndex, Subtree};
pub use resolver::{AccessResolver, DanglingGrant, ResolveAccess, ResolvedAccess};
