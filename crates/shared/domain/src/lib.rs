//! Domain layer - principals, roles, authorities and sessions.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod constants;
pub mod error;
pub mod password;
pub mod role;
pub mod session;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use role::{GrantedAuthority, Role, RoleAssignment, RoleSource};
pub use session::{ClientDetails, SessionHolder, UserSession, UserSessionSource};
pub use user::{AuthorityContainer, NewUser, User, UserDetails, UserResponse};
