//! SeaORM entities of the security tables.

pub mod resource_role;
pub mod role_assignment;
pub mod user;
