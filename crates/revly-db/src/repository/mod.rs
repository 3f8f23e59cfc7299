//! SurrealDB-backed implementations of the `revly-core` repository
//! traits.

mod grant;
mod location;
mod location_group;
mod organization;

pub use grant::SurrealGrantRepository;
pub use location::SurrealLocationRepository;
pub use location_group::SurrealLocationGroupRepository;
pub use organization::SurrealOrganizationRepository;
