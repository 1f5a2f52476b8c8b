//! User principal and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::role::GrantedAuthority;

/// Principal that can hold granted authorities.
pub trait AuthorityContainer {
    fn authorities(&self) -> &[GrantedAuthority];

    fn set_authorities(&mut self, authorities: Vec<GrantedAuthority>);
}

/// Principal subject to authentication and authorization.
///
/// Implementors that can carry authorities expose them through
/// [`UserDetails::authority_container`]; the default returns `None`.
pub trait UserDetails: Clone + Send + Sync + 'static {
    fn username(&self) -> &str;

    /// Build a bare principal with only a username, used for the
    /// `system` and `anonymous` sentinels.
    fn with_username(username: &str) -> Self;

    fn authority_container(&mut self) -> Option<&mut dyn AuthorityContainer> {
        None
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    /// IANA time zone id, e.g. `Europe/Paris`
    pub time_zone_id: Option<String>,
    #[serde(default)]
    pub authorities: Vec<GrantedAuthority>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an active user without personal details
    pub fn new(id: Uuid, username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            first_name: None,
            last_name: None,
            email: None,
            active: true,
            time_zone_id: None,
            authorities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Name shown in UIs: "First Last [username]", or just the username.
    pub fn display_name(&self) -> String {
        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full_name.is_empty() {
            self.username.clone()
        } else {
            format!("{} [{}]", full_name, self.username)
        }
    }

    pub fn has_authority(&self, code: &str) -> bool {
        self.authorities.iter().any(|a| a.authority() == code)
    }

    /// Parsed time zone, ignoring unknown ids
    pub fn time_zone(&self) -> Option<chrono_tz::Tz> {
        self.time_zone_id.as_deref().and_then(|id| id.parse().ok())
    }
}

impl AuthorityContainer for User {
    fn authorities(&self) -> &[GrantedAuthority] {
        &self.authorities
    }

    fn set_authorities(&mut self, authorities: Vec<GrantedAuthority>) {
        self.authorities = authorities;
    }
}

impl UserDetails for User {
    fn username(&self) -> &str {
        &self.username
    }

    fn with_username(username: &str) -> Self {
        User::new(Uuid::new_v4(), username, String::new())
    }

    fn authority_container(&mut self) -> Option<&mut dyn AuthorityContainer> {
        Some(self as &mut dyn AuthorityContainer)
    }
}

/// User creation data transfer object
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 255, message = "Username must not be blank"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub time_zone_id: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            email: None,
            time_zone_id: None,
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub active: bool,
    pub authorities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name(),
            active: user.active,
            authorities: user
                .authorities
                .iter()
                .map(|a| a.authority().to_string())
                .collect(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn test_display_name() {
        let mut user = User::new(Uuid::new_v4(), "jdoe", "hash");
        assert_eq!(user.display_name(), "jdoe");

        user.first_name = Some("John".to_string());
        user.last_name = Some("Doe".to_string());
        assert_eq!(user.display_name(), "John Doe [jdoe]");
    }

    #[test]
    fn test_user_is_authority_container() {
        let mut user = User::with_username("jdoe");
        let container = user.authority_container().expect("users carry authorities");
        container.set_authorities(vec![GrantedAuthority::new(Role::annotated("a", "A"))]);

        assert!(user.has_authority("a"));
        assert!(!user.has_authority("b"));
    }

    #[test]
    fn test_new_user_validation() {
        let valid = NewUser::new("jdoe", "password123");
        assert!(valid.validate().is_ok());

        let mut invalid = NewUser::new("", "short");
        invalid.email = Some("not-an-email".to_string());
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_time_zone_parsing() {
        let mut user = User::new(Uuid::new_v4(), "jdoe", "hash");
        user.time_zone_id = Some("Europe/Paris".to_string());
        assert_eq!(user.time_zone(), Some(chrono_tz::Europe::Paris));

        user.time_zone_id = Some("Mars/Olympus".to_string());
        assert_eq!(user.time_zone(), None);
    }
}
