//! Terraform data sources
//!
//! Each module holds the singular lookup and/or the paginated listing for
//! one entity type.

pub mod connectors;
pub mod groups;
pub mod remote_networks;
pub mod resources;
pub mod security_policies;
pub mod service_accounts;
pub mod users;
