//! Roles, role assignments and granted authorities.

use serde::{Deserialize, Serialize};

/// Where a role definition comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// Registered in application code at startup
    Annotated,
    /// Stored in the database and editable at runtime
    Database,
}

impl std::fmt::Display for RoleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleSource::Annotated => write!(f, "annotated"),
            RoleSource::Database => write!(f, "database"),
        }
    }
}

/// Role definition, identified by its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: RoleSource,
}

impl Role {
    /// Create a role defined in code.
    pub fn annotated(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            source: RoleSource::Annotated,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Association between a username and a role code.
///
/// The role code may reference a role that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: i32,
    pub username: String,
    pub role_code: String,
}

/// Authority granted to a principal by one of its roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedAuthority {
    role: Role,
}

impl GrantedAuthority {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    /// Authority string used in access checks (the role code).
    pub fn authority(&self) -> &str {
        &self.role.code
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

impl From<Role> for GrantedAuthority {
    fn from(role: Role) -> Self {
        Self::new(role)
    }
}

impl std::fmt::Display for GrantedAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.role.code)
    }
}
