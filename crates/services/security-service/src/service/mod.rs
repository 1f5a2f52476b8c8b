//! Service layer - principals, authorities and authentication.

mod authentication;
mod user_repository;

pub use authentication::{AuthenticationService, Authenticator};
pub use user_repository::{AuthorityResolver, DatabaseUserRepository, UserRepository};
