//! Principal lookup and authority resolution.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::repository::{RoleAssignmentRepository, RoleRepository, UserRecordRepository};
use common::{AppError, AppResult};
use domain::{GrantedAuthority, UserDetails, ANONYMOUS_USERNAME, SYSTEM_USERNAME};

/// Source of principals for authentication and authorization.
#[async_trait]
pub trait UserRepository<U: UserDetails>: Send + Sync {
    /// Full-trust principal for internal operations, always the same instance
    fn system_user(&self) -> Arc<U>;

    /// Principal of unauthenticated access, always the same instance
    fn anonymous_user(&self) -> Arc<U>;

    /// Principal with exactly this username, with its authorities.
    ///
    /// # Errors
    /// `UserNotFound` when no record matches.
    async fn load_user_by_username(&self, username: &str) -> AppResult<U>;

    /// Principals whose username contains `fragment`.
    async fn get_by_username_like(&self, fragment: &str) -> AppResult<Vec<U>>;

    /// Authorities granted to `username` through its role assignments.
    async fn resolve_authorities(&self, username: &str) -> AppResult<Vec<GrantedAuthority>>;
}

/// Turns role assignments into granted authorities.
#[derive(Clone)]
pub struct AuthorityResolver {
    assignments: Arc<dyn RoleAssignmentRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl AuthorityResolver {
    pub fn new(assignments: Arc<dyn RoleAssignmentRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { assignments, roles }
    }

    /// Authorities of `username` in assignment order.
    ///
    /// Repeated role codes count once. Codes without a role definition are
    /// skipped.
    pub async fn resolve(&self, username: &str) -> AppResult<Vec<GrantedAuthority>> {
        let assignments = self.assignments.get_assignments_by_username(username).await?;

        let mut seen = HashSet::new();
        let codes: Vec<String> = assignments
            .into_iter()
            .map(|a| a.role_code)
            .filter(|code| seen.insert(code.clone()))
            .collect();

        let roles = try_join_all(codes.iter().map(|code| self.roles.get_role_by_code(code))).await?;

        Ok(codes
            .iter()
            .zip(roles)
            .filter_map(|(code, role)| {
                if role.is_none() {
                    debug!(username, role_code = %code, "Assigned role not found");
                }
                role.map(GrantedAuthority::from)
            })
            .collect())
    }

    /// Attach authorities to principals that can hold them.
    pub async fn attach<U: UserDetails>(&self, user: &mut U) -> AppResult<()> {
        if user.authority_container().is_none() {
            return Ok(());
        }

        let authorities = self.resolve(user.username()).await?;
        if let Some(container) = user.authority_container() {
            container.set_authorities(authorities);
        }
        Ok(())
    }
}

/// User repository backed by the user, role assignment and role stores.
pub struct DatabaseUserRepository<U: UserDetails> {
    users: Arc<dyn UserRecordRepository<U>>,
    authorities: AuthorityResolver,
    system: Arc<U>,
    anonymous: Arc<U>,
}

impl<U: UserDetails> DatabaseUserRepository<U> {
    /// Build the repository and its `system` and `anonymous` principals.
    ///
    /// `system` carries no authorities; `anonymous` gets the authorities
    /// assigned to the `anonymous` username.
    pub async fn initialize(
        users: Arc<dyn UserRecordRepository<U>>,
        assignments: Arc<dyn RoleAssignmentRepository>,
        roles: Arc<dyn RoleRepository>,
    ) -> AppResult<Self> {
        let authorities = AuthorityResolver::new(assignments, roles);

        let system = U::with_username(SYSTEM_USERNAME);
        let mut anonymous = U::with_username(ANONYMOUS_USERNAME);
        authorities.attach(&mut anonymous).await?;

        Ok(Self {
            users,
            authorities,
            system: Arc::new(system),
            anonymous: Arc::new(anonymous),
        })
    }
}

#[async_trait]
impl<U: UserDetails> UserRepository<U> for DatabaseUserRepository<U> {
    fn system_user(&self) -> Arc<U> {
        Arc::clone(&self.system)
    }

    fn anonymous_user(&self) -> Arc<U> {
        Arc::clone(&self.anonymous)
    }

    async fn load_user_by_username(&self, username: &str) -> AppResult<U> {
        let users = self.users.find_by_username(username).await?;
        let count = users.len();

        let Some(mut user) = users.into_iter().next() else {
            return Err(AppError::UserNotFound(username.to_string()));
        };
        if count > 1 {
            warn!(username, count, "Several users share a username, using the first");
        }

        self.authorities.attach(&mut user).await?;
        Ok(user)
    }

    async fn get_by_username_like(&self, fragment: &str) -> AppResult<Vec<U>> {
        self.users.find_by_username_like(fragment).await
    }

    async fn resolve_authorities(&self, username: &str) -> AppResult<Vec<GrantedAuthority>> {
        self.authorities.resolve(username).await
    }
}
