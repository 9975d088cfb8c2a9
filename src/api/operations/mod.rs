//! Domain operations over Microsoft Graph
//!
//! Each submodule adds methods to `GraphClient` for one resource family.

pub mod applications;
pub mod domains;
pub mod licenses;
pub mod organization;
pub mod reports;
pub mod roles;
pub mod sharepoint;
pub mod users;

pub use applications::required_resource_access;
pub use licenses::SkuCatalog;
pub use sharepoint::classify_spo_response;
