pub mod domains;
pub mod licenses;
pub mod org;
pub mod reports;
pub mod roles;
pub mod tenant;
pub mod users;
