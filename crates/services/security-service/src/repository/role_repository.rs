//! Role definitions looked up by code.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::AppResult;
use domain::{Role, FULL_ACCESS_ROLE_CODE, FULL_ACCESS_ROLE_NAME};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role repository trait for dependency injection.
///
/// A missing role is `Ok(None)`, not an error.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn get_role_by_code(&self, code: &str) -> AppResult<Option<Role>>;

    async fn all_roles(&self) -> AppResult<Vec<Role>>;
}

/// Roles registered in code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleRepository {
    roles: Vec<Role>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding the built-in full access role.
    pub fn with_defaults() -> Self {
        Self::new().with_role(
            Role::annotated(FULL_ACCESS_ROLE_CODE, FULL_ACCESS_ROLE_NAME)
                .with_description("All permissions granted"),
        )
    }

    /// Register a role, replacing any role with the same code.
    pub fn with_role(mut self, role: Role) -> Self {
        match self.roles.iter_mut().find(|r| r.code == role.code) {
            Some(existing) => *existing = role,
            None => self.roles.push(role),
        }
        self
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn get_role_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        Ok(self.roles.iter().find(|r| r.code == code).cloned())
    }

    async fn all_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.clone())
    }
}

/// Consults several repositories in order; the first definition of a code wins.
#[derive(Clone, Default)]
pub struct CompositeRoleRepository {
    repositories: Vec<Arc<dyn RoleRepository>>,
}

impl CompositeRoleRepository {
    pub fn new(repositories: Vec<Arc<dyn RoleRepository>>) -> Self {
        Self { repositories }
    }

    pub fn with_repository(mut self, repository: Arc<dyn RoleRepository>) -> Self {
        self.repositories.push(repository);
        self
    }
}

#[async_trait]
impl RoleRepository for CompositeRoleRepository {
    async fn get_role_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        for repository in &self.repositories {
            if let Some(role) = repository.get_role_by_code(code).await? {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }

    async fn all_roles(&self) -> AppResult<Vec<Role>> {
        let mut seen = HashSet::new();
        let mut roles = Vec::new();
        for repository in &self.repositories {
            for role in repository.all_roles().await? {
                if seen.insert(role.code.clone()) {
                    roles.push(role);
                }
            }
        }
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AppError;
    use domain::RoleSource;

    fn database_role(code: &str, name: &str) -> Role {
        Role {
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            source: RoleSource::Database,
        }
    }

    #[tokio::test]
    async fn test_in_memory_defaults() {
        let repo = InMemoryRoleRepository::with_defaults();

        let role = repo.get_role_by_code(FULL_ACCESS_ROLE_CODE).await.unwrap().unwrap();
        assert_eq!(role.name, FULL_ACCESS_ROLE_NAME);
        assert_eq!(role.source, RoleSource::Annotated);
        assert!(repo.get_role_by_code("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_with_role_replaces_same_code() {
        let repo = InMemoryRoleRepository::new()
            .with_role(Role::annotated("a", "First"))
            .with_role(Role::annotated("b", "B"))
            .with_role(Role::annotated("a", "Second"));

        let roles = repo.all_roles().await.unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].name, "Second");
    }

    #[tokio::test]
    async fn test_composite_first_hit_wins() {
        let annotated = InMemoryRoleRepository::new().with_role(Role::annotated("a", "Annotated A"));

        let mut database = MockRoleRepository::new();
        database
            .expect_get_role_by_code()
            .withf(|code| code == "b")
            .returning(|code| Ok(Some(database_role(code, "Database B"))));
        database
            .expect_all_roles()
            .returning(|| Ok(vec![database_role("a", "Database A"), database_role("b", "Database B")]));

        let composite = CompositeRoleRepository::new(vec![Arc::new(annotated), Arc::new(database)]);

        // Found in the first repository, the mock is not consulted
        let a = composite.get_role_by_code("a").await.unwrap().unwrap();
        assert_eq!(a.name, "Annotated A");

        let b = composite.get_role_by_code("b").await.unwrap().unwrap();
        assert_eq!(b.source, RoleSource::Database);

        let names: Vec<_> = composite
            .all_roles()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Annotated A", "Database B"]);
    }

    #[tokio::test]
    async fn test_composite_propagates_errors() {
        let mut failing = MockRoleRepository::new();
        failing
            .expect_get_role_by_code()
            .returning(|_| Err(AppError::internal("connection lost")));

        let composite = CompositeRoleRepository::new(vec![Arc::new(failing)]);
        assert!(matches!(
            composite.get_role_by_code("a").await,
            Err(AppError::Internal(_))
        ));
    }
}
