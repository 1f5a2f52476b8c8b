//! Repository layer for data access.

pub mod entities;
mod role_assignment_store;
mod role_repository;
mod role_store;
mod user_store;

pub use role_assignment_store::{RoleAssignmentRepository, RoleAssignmentStore};
pub use role_repository::{CompositeRoleRepository, InMemoryRoleRepository, RoleRepository};
pub use role_store::RoleStore;
pub use user_store::{UserRecordRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use role_assignment_store::MockRoleAssignmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
