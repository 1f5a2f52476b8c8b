//! User sessions and the current-session source.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::user::User;

/// Details reported by the client that opened the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientDetails {
    /// Locale tag, e.g. `en` or `de-DE`
    pub locale: Option<String>,
    pub time_zone: Option<Tz>,
    /// Remote address as reported by the transport
    pub address: Option<String>,
}

impl ClientDetails {
    pub fn with_time_zone(time_zone: Tz) -> Self {
        Self {
            time_zone: Some(time_zone),
            ..Self::default()
        }
    }
}

/// Authenticated session of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserSession {
    pub id: Uuid,
    pub user: User,
    pub client_details: Option<ClientDetails>,
    pub started_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user: User, client_details: Option<ClientDetails>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            client_details,
            started_at: Utc::now(),
        }
    }

    /// Client time zone, if the client reported one
    pub fn time_zone(&self) -> Option<Tz> {
        self.client_details.as_ref().and_then(|d| d.time_zone)
    }
}

/// Source of the current user session.
pub trait UserSessionSource: Send + Sync {
    /// Whether a session is currently active
    fn check_current_user_session(&self) -> bool;

    /// The active session.
    ///
    /// # Errors
    /// Returns `NotFound` when no session is active.
    fn user_session(&self) -> DomainResult<Arc<UserSession>>;
}

/// Current-session slot shared between the authentication flow and
/// session consumers.
#[derive(Debug, Default)]
pub struct SessionHolder {
    current: RwLock<Option<Arc<UserSession>>>,
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: UserSession) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(session))),
        }
    }

    /// Replace the current session, returning the previous one.
    pub fn set(&self, session: UserSession) -> DomainResult<Option<Arc<UserSession>>> {
        let mut slot = self.current.write().map_err(|_| poisoned())?;
        Ok(slot.replace(Arc::new(session)))
    }

    /// End the current session, returning it.
    pub fn clear(&self) -> DomainResult<Option<Arc<UserSession>>> {
        let mut slot = self.current.write().map_err(|_| poisoned())?;
        Ok(slot.take())
    }
}

impl UserSessionSource for SessionHolder {
    fn check_current_user_session(&self) -> bool {
        self.current
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    fn user_session(&self) -> DomainResult<Arc<UserSession>> {
        self.current
            .read()
            .map_err(|_| poisoned())?
            .clone()
            .ok_or_else(|| DomainError::not_found("user session"))
    }
}

fn poisoned() -> DomainError {
    DomainError::internal("session holder lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserDetails;

    #[test]
    fn test_empty_holder_has_no_session() {
        let holder = SessionHolder::new();
        assert!(!holder.check_current_user_session());
        assert!(matches!(holder.user_session(), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_set_and_clear() {
        let holder = SessionHolder::new();
        let session = UserSession::new(
            User::with_username("jdoe"),
            Some(ClientDetails::with_time_zone(chrono_tz::Europe::Paris)),
        );

        assert!(holder.set(session).unwrap().is_none());
        assert!(holder.check_current_user_session());

        let current = holder.user_session().unwrap();
        assert_eq!(current.user.username, "jdoe");
        assert_eq!(current.time_zone(), Some(chrono_tz::Europe::Paris));

        assert!(holder.clear().unwrap().is_some());
        assert!(!holder.check_current_user_session());
    }
}
