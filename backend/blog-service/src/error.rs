/// Error types for blog-service
///
/// Every service and store operation returns [`AppError`]. The HTTP layer maps
/// each variant to a status code through [`ResponseError`].
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// PostgreSQL SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL SQLSTATE for unique violations
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for CHECK constraint violations
const CHECK_VIOLATION: &str = "23514";

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced group, user or post does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Actor lacks permission for the requested mutation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Malformed input, reported per field
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// No authenticated identity on the request
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Duplicate resource (slug, username)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed path or query input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.add(field, message);
        AppError::Validation(errors)
    }
}

/// Field name -> messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                fields.add(&field.to_string(), message);
            }
        }
        fields
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            AppError::Validation(fields) => serde_json::json!({
                "error": "Validation error",
                "status": status.as_u16(),
                "fields": fields,
            }),
            // Store details stay in the logs
            AppError::Database(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                serde_json::json!({
                    "error": "Internal server error",
                    "status": status.as_u16(),
                })
            }
            _ => serde_json::json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            }),
        };

        HttpResponse::build(status).json(body)
    }
}

impl AppError {
    /// Map a constraint violation by SQLSTATE; `None` for anything else.
    fn from_sqlstate(code: Option<&str>, message: &str) -> Option<Self> {
        match code? {
            FOREIGN_KEY_VIOLATION => Some(AppError::NotFound(format!(
                "referenced row missing: {}",
                message
            ))),
            UNIQUE_VIOLATION => Some(AppError::Conflict(message.to_string())),
            CHECK_VIOLATION => Some(AppError::BadRequest(message.to_string())),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err) => {
                AppError::from_sqlstate(db_err.code().as_deref(), db_err.message())
                    .unwrap_or_else(|| AppError::Database(err.to_string()))
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::NotFound("post 1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("not the author".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::invalid_field("text", "must not be blank").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_errors_display_joins_messages() {
        let mut errors = FieldErrors::default();
        errors.add("text", "must not be blank");
        errors.add("group", "unknown group");
        errors.add("text", "too long");

        assert_eq!(
            errors.to_string(),
            "group: unknown group; text: must not be blank, too long"
        );
        assert_eq!(errors.get("text").map(|m| m.len()), Some(2));
    }

    #[test]
    fn constraint_violations_map_by_sqlstate() {
        let check = AppError::from_sqlstate(Some("23514"), "follows_no_self_follow");
        assert!(matches!(check, Some(AppError::BadRequest(_))));
        assert_eq!(check.map(|e| e.status_code()), Some(StatusCode::BAD_REQUEST));

        assert!(matches!(
            AppError::from_sqlstate(Some("23505"), "users_username_key"),
            Some(AppError::Conflict(_))
        ));
        assert!(matches!(
            AppError::from_sqlstate(Some("23503"), "posts_group_id_fkey"),
            Some(AppError::NotFound(_))
        ));
        assert!(AppError::from_sqlstate(Some("40001"), "serialization").is_none());
        assert!(AppError::from_sqlstate(None, "no code").is_none());
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
