//! Expand command - show how the query macros rewrite a query.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use common::{AppError, AppResult};
use domain::{ClientDetails, SessionHolder, User, UserDetails, UserSession, ANONYMOUS_USERNAME};
use query_macro_lib::{ParamValue, QueryMacroConfig, QueryMacroExpander, TimeZoneResolver};
use security_service_lib::service::UserRepository;

use super::connect;
use crate::cli::ExpandArgs;

pub async fn execute(args: ExpandArgs) -> AppResult<()> {
    let time_zone = args.time_zone.as_deref().map(parse_time_zone).transpose()?;
    let now = match args.now.as_deref() {
        Some(now) => parse_timestamp(now)?,
        None => Utc::now(),
    };
    let mut params = args
        .params
        .iter()
        .map(|param| parse_param(param))
        .collect::<AppResult<HashMap<_, _>>>()?;

    let sessions = Arc::new(SessionHolder::new());
    if let Some(session) = session(args.username.as_deref(), time_zone).await? {
        sessions.set(session)?;
    }

    let expander = QueryMacroExpander::with_defaults(
        &QueryMacroConfig::from_env(),
        TimeZoneResolver::with_sessions(sessions),
    );
    let expansion = expander.expand(&args.query)?;
    expander.bind(&expansion, &mut params, now)?;

    println!("{}", expansion.query);
    for (name, param_type) in &expansion.param_types {
        println!("  {}: {:?}", name, param_type);
    }

    let mut bound: Vec<_> = params.into_iter().collect();
    bound.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in bound {
        println!("  :{} = {}", name, format_value(&value));
    }

    Ok(())
}

/// Session for `--username`, or an anonymous one carrying `--time-zone`.
async fn session(username: Option<&str>, time_zone: Option<Tz>) -> AppResult<Option<UserSession>> {
    match username {
        Some(username) => {
            let services = connect().await?;
            let user = services.user_repository.load_user_by_username(username).await?;
            let zone = time_zone.or_else(|| user.time_zone());
            Ok(Some(UserSession::new(
                user,
                Some(ClientDetails {
                    time_zone: zone,
                    ..ClientDetails::default()
                }),
            )))
        }
        None => Ok(time_zone.map(|zone| {
            UserSession::new(
                User::with_username(ANONYMOUS_USERNAME),
                Some(ClientDetails::with_time_zone(zone)),
            )
        })),
    }
}

fn parse_time_zone(id: &str) -> AppResult<Tz> {
    id.trim()
        .parse::<Tz>()
        .map_err(|_| AppError::bad_request(format!("Unknown time zone '{}'", id)))
}

fn parse_timestamp(text: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::bad_request(format!("Invalid timestamp '{}': {}", text, e)))
}

fn parse_param(param: &str) -> AppResult<(String, ParamValue)> {
    let (name, value) = param
        .split_once('=')
        .ok_or_else(|| AppError::bad_request(format!("Expected NAME=VALUE, got '{}'", param)))?;

    let value = value.trim();
    let parsed = match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => ParamValue::Date(date),
        Err(_) => match parse_timestamp(value) {
            Ok(ts) => ParamValue::Timestamp(ts),
            Err(_) => match value.parse::<i64>() {
                Ok(n) => ParamValue::Integer(n),
                Err(_) => ParamValue::Text(value.to_string()),
            },
        },
    };
    Ok((name.trim().trim_start_matches(':').to_string(), parsed))
}

fn format_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Timestamp(ts) => ts.to_rfc3339(),
        ParamValue::Date(date) => date.to_string(),
        ParamValue::Text(text) => format!("'{}'", text),
        ParamValue::Integer(n) => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_kinds() {
        assert_eq!(
            parse_param(":d=2024-05-01").unwrap(),
            ("d".to_string(), ParamValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
        assert!(matches!(
            parse_param("ts=2024-05-01T10:00:00+02:00").unwrap().1,
            ParamValue::Timestamp(_)
        ));
        assert_eq!(parse_param("n=42").unwrap().1, ParamValue::Integer(42));
        assert_eq!(parse_param("s=abc").unwrap().1, ParamValue::Text("abc".into()));
        assert!(parse_param("missing-separator").is_err());
    }

    #[test]
    fn test_parse_time_zone() {
        assert_eq!(parse_time_zone(" Europe/Paris ").unwrap(), chrono_tz::Europe::Paris);
        assert!(matches!(parse_time_zone("Mars/Olympus"), Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_anonymous_session_carries_time_zone() {
        let tokyo = session(None, Some(chrono_tz::Asia::Tokyo)).await.unwrap().unwrap();
        assert_eq!(tokyo.user.username, ANONYMOUS_USERNAME);
        assert_eq!(tokyo.time_zone(), Some(chrono_tz::Asia::Tokyo));

        assert!(session(None, None).await.unwrap().is_none());
    }
}
