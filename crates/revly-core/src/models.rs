//! Domain models for Revly, shared by every crate in the workspace.

pub mod grant;
pub mod location;
pub mod location_group;
pub mod organization;
