//! Authentication service - verifies credentials and opens user sessions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::user_repository::UserRepository;
use common::{AppError, AppResult};
use domain::{ClientDetails, Password, SessionHolder, User, UserSession};

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthenticationService: Send + Sync {
    /// Verify credentials and open a session.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        client: Option<ClientDetails>,
    ) -> AppResult<UserSession>;

    /// Session of the anonymous principal
    fn anonymous_session(&self) -> UserSession;
}

/// Password authentication against a user repository.
pub struct Authenticator {
    users: Arc<dyn UserRepository<User>>,
    sessions: Option<Arc<SessionHolder>>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository<User>>) -> Self {
        Self {
            users,
            sessions: None,
        }
    }

    /// Publish every opened session to `sessions`.
    pub fn with_session_holder(mut self, sessions: Arc<SessionHolder>) -> Self {
        self.sessions = Some(sessions);
        self
    }
}

#[async_trait]
impl AuthenticationService for Authenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        client: Option<ClientDetails>,
    ) -> AppResult<UserSession> {
        let user = match self.users.load_user_by_username(username).await {
            Ok(user) => user,
            Err(AppError::UserNotFound(_)) => {
                // Same hashing cost as for existing users
                let _ = Password::dummy().verify(password);
                debug!(username, "Login attempt for unknown user");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !Password::from_hash(user.password_hash.as_str()).verify(password) {
            return Err(AppError::InvalidCredentials);
        }
        if !user.active {
            return Err(AppError::AccountDisabled);
        }

        let mut client = client.unwrap_or_default();
        if client.time_zone.is_none() {
            client.time_zone = user.time_zone();
        }

        let session = UserSession::new(user, Some(client));
        if let Some(sessions) = &self.sessions {
            sessions.set(session.clone())?;
        }

        info!(username, session_id = %session.id, "User authenticated");
        Ok(session)
    }

    fn anonymous_session(&self) -> UserSession {
        UserSession::new(self.users.anonymous_user().as_ref().clone(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{GrantedAuthority, UserSessionSource};
    use uuid::Uuid;

    const PASSWORD: &str = "correct-horse";

    /// Repository holding fixed users.
    struct FixedUsers {
        users: Vec<User>,
        anonymous: Arc<User>,
        system: Arc<User>,
    }

    impl FixedUsers {
        fn new(users: Vec<User>) -> Arc<Self> {
            Arc::new(Self {
                users,
                anonymous: Arc::new(User::new(Uuid::new_v4(), "anonymous", "")),
                system: Arc::new(User::new(Uuid::new_v4(), "system", "")),
            })
        }
    }

    #[async_trait]
    impl UserRepository<User> for FixedUsers {
        fn system_user(&self) -> Arc<User> {
            Arc::clone(&self.system)
        }

        fn anonymous_user(&self) -> Arc<User> {
            Arc::clone(&self.anonymous)
        }

        async fn load_user_by_username(&self, username: &str) -> AppResult<User> {
            self.users
                .iter()
                .find(|u| u.username == username)
                .cloned()
                .ok_or_else(|| AppError::UserNotFound(username.to_string()))
        }

        async fn get_by_username_like(&self, fragment: &str) -> AppResult<Vec<User>> {
            Ok(self
                .users
                .iter()
                .filter(|u| u.username.contains(fragment))
                .cloned()
                .collect())
        }

        async fn resolve_authorities(&self, _username: &str) -> AppResult<Vec<GrantedAuthority>> {
            Ok(vec![])
        }
    }

    fn user(username: &str) -> User {
        let hash = Password::new(PASSWORD).unwrap().into_string();
        User::new(Uuid::new_v4(), username, hash)
    }

    #[tokio::test]
    async fn test_authenticate_success_uses_user_time_zone() {
        let mut jdoe = user("jdoe");
        jdoe.time_zone_id = Some("Europe/Paris".to_string());
        let auth = Authenticator::new(FixedUsers::new(vec![jdoe]));

        let session = auth.authenticate("jdoe", PASSWORD, None).await.unwrap();
        assert_eq!(session.user.username, "jdoe");
        assert_eq!(session.time_zone(), Some(chrono_tz::Europe::Paris));
    }

    #[tokio::test]
    async fn test_client_time_zone_takes_precedence() {
        let mut jdoe = user("jdoe");
        jdoe.time_zone_id = Some("Europe/Paris".to_string());
        let auth = Authenticator::new(FixedUsers::new(vec![jdoe]));

        let client = ClientDetails::with_time_zone(chrono_tz::Asia::Tokyo);
        let session = auth.authenticate("jdoe", PASSWORD, Some(client)).await.unwrap();
        assert_eq!(session.time_zone(), Some(chrono_tz::Asia::Tokyo));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let auth = Authenticator::new(FixedUsers::new(vec![user("jdoe")]));

        assert!(matches!(
            auth.authenticate("jdoe", "wrong-password", None).await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("nobody", PASSWORD, None).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_disabled_account() {
        let mut jdoe = user("jdoe");
        jdoe.active = false;
        let auth = Authenticator::new(FixedUsers::new(vec![jdoe]));

        assert!(matches!(
            auth.authenticate("jdoe", PASSWORD, None).await,
            Err(AppError::AccountDisabled)
        ));
    }

    #[tokio::test]
    async fn test_session_is_published() {
        let holder = Arc::new(SessionHolder::new());
        let auth = Authenticator::new(FixedUsers::new(vec![user("jdoe")]))
            .with_session_holder(Arc::clone(&holder));

        let session = auth.authenticate("jdoe", PASSWORD, None).await.unwrap();
        assert!(holder.check_current_user_session());
        assert_eq!(holder.user_session().unwrap().id, session.id);
    }

    #[test]
    fn test_anonymous_session() {
        let auth = Authenticator::new(FixedUsers::new(vec![]));

        let session = auth.anonymous_session();
        assert_eq!(session.user.username, "anonymous");
        assert!(session.client_details.is_none());
    }
}
