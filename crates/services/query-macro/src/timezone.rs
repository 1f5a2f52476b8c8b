//! Resolution of the `USER_TIMEZONE` macro argument.

use std::fmt;
use std::sync::Arc;

use chrono_tz::Tz;
use common::{AppError, AppResult};
use domain::{DomainError, UserSessionSource, USER_TIMEZONE_TOKEN};

/// Resolves the time zone a macro should compute boundaries in.
#[derive(Clone, Default)]
pub struct TimeZoneResolver {
    sessions: Option<Arc<dyn UserSessionSource>>,
}

impl TimeZoneResolver {
    pub fn new(sessions: Option<Arc<dyn UserSessionSource>>) -> Self {
        Self { sessions }
    }

    pub fn with_sessions(sessions: Arc<dyn UserSessionSource>) -> Self {
        Self::new(Some(sessions))
    }

    /// Time zone named by `args[pos]`.
    ///
    /// Only the `USER_TIMEZONE` token is recognized; it yields the current
    /// session's client time zone. `None` is returned for any other value,
    /// a missing position, or a session without a client zone.
    ///
    /// # Errors
    /// `Configuration` when the token is used but no session source is set.
    pub fn resolve(&self, args: &[&str], pos: usize) -> AppResult<Option<Tz>> {
        let Some(arg) = args.get(pos) else {
            return Ok(None);
        };
        if !arg.trim().eq_ignore_ascii_case(USER_TIMEZONE_TOKEN) {
            return Ok(None);
        }

        let sessions = self.sessions.as_ref().ok_or_else(|| {
            AppError::configuration(format!(
                "{} requires a user session source",
                USER_TIMEZONE_TOKEN
            ))
        })?;

        // The session may end between the check and the fetch
        if !sessions.check_current_user_session() {
            return Ok(None);
        }
        match sessions.user_session() {
            Ok(session) => Ok(session.time_zone()),
            Err(DomainError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl fmt::Debug for TimeZoneResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeZoneResolver")
            .field("sessions", &self.sessions.is_some())
            .finish()
    }
}
