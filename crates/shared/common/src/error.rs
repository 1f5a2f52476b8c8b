//! Unified error handling.
//!
//! Every error kind maps to a fixed HTTP status and one of two payload
//! shapes: an [`ErrorInfo`] object or a list of [`ConstraintViolationInfo`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Title used for errors whose details must not reach the client.
const SERVER_ERROR: &str = "Server error";

/// Message template of violations raised by custom validation code.
const CUSTOM_VALIDATION_TEMPLATE: &str = "{custom_validation}";

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Row-level security violation: {0}")]
    RowLevelSecurity(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("{} constraint violation(s)", .0.len())]
    ConstraintViolations(Vec<ConstraintViolationInfo>),

    #[error("Method result validation failed: {0}")]
    MethodResultValidation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Invalid query macro: {0}")]
    InvalidMacro(String),

    /// Error raised deliberately by an endpoint with its own status
    #[error("{message}")]
    RestApi {
        status: StatusCode,
        message: String,
        details: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error body for single errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub error: String,
    pub details: String,
}

/// One failed constraint, as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolationInfo {
    /// Dotted property path, `""` for object-level violations
    pub path: String,
    pub message: String,
    pub message_template: String,
    /// Rejected value; only strings, numbers and booleans are reported
    pub invalid_value: Option<serde_json::Value>,
}

/// Response body, one of the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Info(ErrorInfo),
    Violations(Vec<ConstraintViolationInfo>),
}

impl ConstraintViolationInfo {
    /// Violation raised by custom validation code rather than a constraint.
    pub fn custom(message: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            message: message.into(),
            message_template: CUSTOM_VALIDATION_TEMPLATE.to_string(),
            invalid_value: None,
        }
    }

    /// Flatten validator errors into violations sorted by path.
    ///
    /// Nested structs produce `parent.child` paths and list items
    /// produce `items[0].name` paths.
    pub fn from_validation_errors(errors: &ValidationErrors) -> Vec<Self> {
        let mut violations = Vec::new();
        collect_violations("", errors, &mut violations);
        violations.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.message_template.cmp(&b.message_template))
        });
        violations
    }

    fn from_field_error(path: &str, error: &ValidationError) -> Self {
        let message = error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{} is invalid", path));

        Self {
            path: path.to_string(),
            message,
            message_template: format!("{{validator.{}}}", error.code),
            invalid_value: error
                .params
                .get("value")
                .filter(|value| is_reportable_value(value))
                .cloned(),
        }
    }
}

fn collect_violations(prefix: &str, errors: &ValidationErrors, out: &mut Vec<ConstraintViolationInfo>) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        let path = if field == "__all__" {
            prefix.to_string()
        } else if prefix.is_empty() {
            field
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push(ConstraintViolationInfo::from_field_error(&path, error));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_violations(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_violations(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

fn is_reportable_value(value: &serde_json::Value) -> bool {
    matches!(
        value,
        serde_json::Value::String(_) | serde_json::Value::Number(_) | serde_json::Value::Bool(_)
    )
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::AccountDisabled => "ACCOUNT_DISABLED",
            AppError::RowLevelSecurity(_) => "ROW_LEVEL_SECURITY",
            AppError::NotFound => "NOT_FOUND",
            AppError::UserNotFound(_) => "USER_NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ConstraintViolations(_) => "CONSTRAINT_VIOLATION",
            AppError::MethodResultValidation(_) => "RESULT_VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidMacro(_) => "INVALID_QUERY_MACRO",
            AppError::RestApi { .. } => "REST_API_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::AccountDisabled => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::RowLevelSecurity(_) => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_)
            | AppError::ConstraintViolations(_)
            | AppError::BadRequest(_)
            | AppError::InvalidMacro(_) => StatusCode::BAD_REQUEST,
            AppError::RestApi { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the response body, logging at the level each kind calls for.
    pub fn payload(&self) -> ErrorPayload {
        match self {
            AppError::ConstraintViolations(violations) => {
                tracing::debug!("Constraint violations: {:?}", violations);
                ErrorPayload::Violations(violations.clone())
            }
            AppError::Validation(msg) => {
                tracing::debug!("Custom validation failed: {}", msg);
                ErrorPayload::Violations(vec![ConstraintViolationInfo::custom(msg.clone())])
            }
            _ => ErrorPayload::Info(self.error_info()),
        }
    }

    fn error_info(&self) -> ErrorInfo {
        let (error, details) = match self {
            AppError::RestApi {
                message,
                details,
                cause,
                ..
            } => {
                match cause {
                    Some(cause) => tracing::error!("RestApi error: {}, {}: {}", message, details, cause),
                    None => tracing::info!("RestApi error: {}, {}", message, details),
                }
                (message.clone(), details.clone())
            }
            AppError::RowLevelSecurity(msg) => {
                tracing::error!("Row-level security violation: {}", msg);
                ("Forbidden".to_string(), msg.clone())
            }
            AppError::MethodResultValidation(msg) => {
                tracing::error!("Method result validation failed: {}", msg);
                (SERVER_ERROR.to_string(), String::new())
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (SERVER_ERROR.to_string(), String::new())
            }
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (SERVER_ERROR.to_string(), String::new())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (SERVER_ERROR.to_string(), String::new())
            }
            _ => (self.to_string(), String::new()),
        };

        ErrorInfo {
            code: self.code().to_string(),
            error,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.payload())).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Password(msg) => AppError::Validation(msg),
            DomainError::NotFound(_) => AppError::NotFound,
            DomainError::Configuration(msg) => AppError::Configuration(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ConstraintViolations(ConstraintViolationInfo::from_validation_errors(&errors))
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn invalid_macro(msg: impl Into<String>) -> Self {
        AppError::InvalidMacro(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn rest_api(status: StatusCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        AppError::RestApi {
            status,
            message: message.into(),
            details: details.into(),
            cause: None,
        }
    }

    /// Attach a cause to a `RestApi` error; other kinds are returned unchanged.
    pub fn with_cause(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        match self {
            AppError::RestApi {
                status,
                message,
                details,
                ..
            } => AppError::RestApi {
                status,
                message,
                details,
                cause: Some(Box::new(source)),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Address {
        #[validate(length(min = 2, message = "City is too short"))]
        city: String,
    }

    #[derive(Debug, Validate)]
    struct Customer {
        #[validate(length(min = 3, message = "Name is too short"))]
        name: String,
        #[validate(range(min = 18))]
        age: u32,
        #[validate(nested)]
        address: Address,
    }

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::UserNotFound("bob".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::RowLevelSecurity("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::invalid_macro("@between").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::configuration("missing").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::rest_api(StatusCode::UNPROCESSABLE_ENTITY, "msg", "details").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_rest_api_error_body() {
        let (status, body) =
            body_json(AppError::rest_api(StatusCode::CONFLICT, "Entity locked", "by admin")).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Entity locked");
        assert_eq!(body["details"], "by admin");
        assert_eq!(body["code"], "REST_API_ERROR");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = body_json(AppError::internal("stack trace here")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server error");
        assert_eq!(body["details"], "");

        let (_, body) = body_json(AppError::MethodResultValidation("bad result".into())).await;
        assert_eq!(body["error"], "Server error");
    }

    #[tokio::test]
    async fn test_row_level_security_body() {
        let (status, body) = body_json(AppError::RowLevelSecurity("Order#42".into())).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["details"], "Order#42");
    }

    #[tokio::test]
    async fn test_custom_validation_is_single_violation() {
        let (status, body) = body_json(AppError::validation("Dates overlap")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!([{
                "path": "",
                "message": "Dates overlap",
                "messageTemplate": "{custom_validation}",
                "invalidValue": null
            }])
        );
    }

    #[tokio::test]
    async fn test_constraint_violations_body() {
        let customer = Customer {
            name: "Al".to_string(),
            age: 12,
            address: Address {
                city: "X".to_string(),
            },
        };
        let error = AppError::from(customer.validate().unwrap_err());
        let (status, body) = body_json(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let violations = body.as_array().unwrap();
        let paths: Vec<&str> = violations
            .iter()
            .map(|v| v["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["address.city", "age", "name"]);

        assert_eq!(violations[0]["message"], "City is too short");
        assert_eq!(violations[0]["messageTemplate"], "{validator.length}");
        assert_eq!(violations[0]["invalidValue"], "X");
        assert_eq!(violations[1]["invalidValue"], 12);
        assert_eq!(violations[1]["message"], "age is invalid");
    }

    #[test]
    fn test_domain_error_conversion() {
        assert!(matches!(
            AppError::from(DomainError::configuration("no session source")),
            AppError::Configuration(_)
        ));
        assert!(matches!(
            AppError::from(DomainError::not_found("session")),
            AppError::NotFound
        ));
        assert!(matches!(
            AppError::from(DomainError::password("too short")),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn test_with_cause_only_affects_rest_api_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error = AppError::rest_api(StatusCode::BAD_GATEWAY, "Upstream failed", "")
            .with_cause(io);
        assert!(std::error::Error::source(&error).is_some());

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(matches!(AppError::NotFound.with_cause(io), AppError::NotFound));
    }
}
