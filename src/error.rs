//! Application error type and its HTTP mapping.
//!
//! Every fallible operation in the service returns [`AppError`]. Handlers return it directly and
//! axum renders it through [`IntoResponse`] as
//!
//! ```json
//! { "error": { "code": "slug_taken", "message": "...", "details": { ... } } }
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload embedded in every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors produced by link allocation, resolution and the supporting stores.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Destination is malformed or uses a scheme other than http/https.
    #[error("{message}")]
    InvalidDestination { message: String, details: Value },

    /// Requested slug fails the pattern, length or reserved-word checks.
    #[error("{message}")]
    InvalidSlugFormat { message: String, details: Value },

    /// Malformed request payload or query parameters.
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    Forbidden { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The atomic insert found an existing row for the requested slug.
    #[error("Slug '{slug}' is already taken")]
    SlugTaken { slug: String },

    /// Random generation ran out of attempts without finding a free slug.
    #[error("Unable to allocate a unique slug after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    /// The store failed while resolving a slug for a redirect.
    #[error("{message}")]
    LookupFailed { message: String, details: Value },

    /// The store is unreachable or returned an error.
    #[error("{message}")]
    Store { message: String, details: Value },
}

impl AppError {
    pub fn invalid_destination(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidDestination {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_slug_format(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidSlugFormat {
            message: message.into(),
            details,
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn lookup_failed(message: impl Into<String>, details: Value) -> Self {
        Self::LookupFailed {
            message: message.into(),
            details,
        }
    }

    pub fn store(message: impl Into<String>, details: Value) -> Self {
        Self::Store {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidDestination { .. }
            | Self::InvalidSlugFormat { .. }
            | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::SlugTaken { .. } => StatusCode::CONFLICT,
            Self::AllocationExhausted { .. } | Self::LookupFailed { .. } | Self::Store { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into the serializable payload used in responses.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            Self::InvalidDestination { details, .. } => ("invalid_destination", details.clone()),
            Self::InvalidSlugFormat { details, .. } => ("invalid_slug_format", details.clone()),
            Self::Validation { details, .. } => ("validation_error", details.clone()),
            Self::Unauthorized { details, .. } => ("unauthorized", details.clone()),
            Self::Forbidden { details, .. } => ("forbidden", details.clone()),
            Self::NotFound { details, .. } => ("not_found", details.clone()),
            Self::SlugTaken { slug } => ("slug_taken", json!({ "slug": slug })),
            Self::AllocationExhausted { attempts } => {
                ("allocation_exhausted", json!({ "attempts": attempts }))
            }
            Self::LookupFailed { details, .. } => ("lookup_failed", details.clone()),
            Self::Store { details, .. } => ("store_error", details.clone()),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = ?e, "Database error");

        let kind = match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "unavailable",
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "connection",
            _ => "query",
        };

        AppError::store("Database error", json!({ "kind": kind }))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();

        AppError::bad_request("Request validation failed", json!({ "fields": fields }))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(
            "Malformed JSON body",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(
            "Malformed query parameters",
            json!({ "reason": rejection.body_text() }),
        )
    }
}
