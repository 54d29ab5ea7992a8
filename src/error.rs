// src/error.rs
//! Service error types.
//!
//! `AppError` is what the pipeline and the HTTP surface speak. Cache
//! failures have their own type, `CacheError`, because they never reach a
//! caller: the read-through layer logs them and degrades to a miss.

use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
///
/// Instead of matching against magic strings like `"rate_limited"`,
/// the vocabulary the Notion API reports is encoded in the type system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded
    RateLimited,
    /// The requested object does not exist or is inaccessible
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Main service error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),

    #[error(transparent)]
    NotionClient(#[from] NotionClientError),
}

impl AppError {
    /// Whether the failure was caused by the request or the local
    /// configuration rather than by Notion.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingConfiguration(_) | AppError::ValidationError(_)
        )
    }

    /// Structured detail attached to 500 responses.
    ///
    /// Provider failures carry the provider's own payload so callers can
    /// tell a rate limit from an authorization problem.
    pub fn details(&self) -> Value {
        match self {
            AppError::NotionClient(NotionClientError::NotionApi {
                status,
                code,
                message,
                request_id,
            }) => json!({
                "status": status,
                "code": code.to_string(),
                "message": message,
                "request_id": request_id,
            }),
            AppError::NotionService {
                code,
                message,
                status,
            } => json!({
                "status": status.as_u16(),
                "code": code.to_string(),
                "message": message,
            }),
            other => json!({ "message": other.to_string() }),
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::InternalError {
            message: "Failed to build Notion API URL".to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Failures reported by the Notion API itself.
#[derive(Error, Debug)]
pub enum NotionClientError {
    #[error("Failed to deserialize response: {source}\nBody: {body}")]
    Deserialization {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Notion API error ({status}): {code} - {message}")]
    NotionApi {
        status: u32,
        code: NotionErrorCode,
        message: String,
        request_id: Option<String>,
    },
}

/// Cache backend failures. Logged by the read-through layer, never
/// returned to HTTP callers except through the connectivity probe.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Cache entry '{key}' could not be encoded: {source}")]
    Encoding {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache entry '{key}' was not readable after being written")]
    NotStored { key: String },

    #[error("Cache {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidationError;

    #[test]
    fn error_codes_round_trip_through_display() {
        for code in [
            "rate_limited",
            "object_not_found",
            "unauthorized",
            "restricted_resource",
            "validation_error",
            "service_unavailable",
        ] {
            assert_eq!(NotionErrorCode::from_api_response(code).to_string(), code);
        }
        assert_eq!(
            NotionErrorCode::from_api_response("brand_new_code"),
            NotionErrorCode::Unknown("brand_new_code".to_string())
        );
        assert_eq!(NotionErrorCode::from_http_status(502).to_string(), "http_502");
    }

    #[test]
    fn client_errors_are_configuration_and_validation() {
        assert!(AppError::MissingConfiguration("x".into()).is_client_error());
        assert!(AppError::from(ValidationError::EmptyField("id")).is_client_error());
        assert!(!AppError::from(NotionClientError::NotionApi {
            status: 401,
            code: NotionErrorCode::Unauthorized,
            message: "API token is invalid.".into(),
            request_id: None,
        })
        .is_client_error());
    }

    #[test]
    fn provider_details_carry_the_notion_payload() {
        let err = AppError::from(NotionClientError::NotionApi {
            status: 429,
            code: NotionErrorCode::RateLimited,
            message: "Slow down".to_string(),
            request_id: Some("req_1".to_string()),
        });
        let details = err.details();
        assert_eq!(details["status"], 429);
        assert_eq!(details["code"], "rate_limited");
        assert_eq!(details["request_id"], "req_1");
    }
}
