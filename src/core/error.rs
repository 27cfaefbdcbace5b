//! Typed error handling for the shipline service
//!
//! This module provides the error taxonomy shared by every layer above the
//! storage and gateway seams. Handlers return [`ShiplineError`] and axum maps
//! it to the HTTP contract via [`IntoResponse`]:
//!
//! - `Validation` -> 400 with field-level detail
//! - `InvalidPayload` -> 422 (request body failed to parse as the schema)
//! - `NotFound` -> 404
//! - `Business` -> 400 with a human-readable reason
//! - `Gateway` -> 502 (shipment provider rejected, timed out, or errored)
//! - `Storage` -> 500 with a generic message
//!
//! Gateway-layer failures are absorbed into `Option`/`bool` results inside
//! [`crate::gateway`] and never raise across that boundary; the lifecycle
//! manager converts them into `Gateway` errors once it decides the operation
//! cannot proceed.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for shipline operations
#[derive(Debug)]
pub enum ShiplineError {
    /// Input failed field-level validation
    Validation(Vec<FieldValidationError>),

    /// Request body could not be parsed as the expected schema
    InvalidPayload { message: String },

    /// A referenced resource does not exist
    NotFound { resource: &'static str, key: String },

    /// A business rule rejected the operation
    Business { message: String },

    /// The shipment gateway failed; nothing was committed
    Gateway { message: String },

    /// Persistence-layer failure; transaction rolled back
    Storage { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ShiplineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiplineError::Validation(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ShiplineError::InvalidPayload { message } => {
                write!(f, "Invalid request payload: {}", message)
            }
            ShiplineError::NotFound { resource, key } => {
                write!(f, "{} with ID {} not found.", resource, key)
            }
            ShiplineError::Business { message } => write!(f, "{}", message),
            ShiplineError::Gateway { message } => write!(f, "{}", message),
            ShiplineError::Storage { message } => write!(f, "Storage error: {}", message),
        }
    }
}

impl std::error::Error for ShiplineError {}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ShiplineError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShiplineError::Validation(_) => StatusCode::BAD_REQUEST,
            ShiplineError::InvalidPayload { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ShiplineError::NotFound { .. } => StatusCode::NOT_FOUND,
            ShiplineError::Business { .. } => StatusCode::BAD_REQUEST,
            ShiplineError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            ShiplineError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ShiplineError::Validation(_) => "VALIDATION_ERROR",
            ShiplineError::InvalidPayload { .. } => "INVALID_PAYLOAD",
            ShiplineError::NotFound { .. } => "NOT_FOUND",
            ShiplineError::Business { .. } => "BUSINESS_RULE_VIOLATION",
            ShiplineError::Gateway { .. } => "SHIPMENT_GATEWAY_FAILURE",
            ShiplineError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            // Persistence detail never leaks to clients
            message: match self {
                ShiplineError::Storage { .. } => "Internal storage error.".to_string(),
                other => other.to_string(),
            },
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ShiplineError::Validation(errors) => Some(serde_json::json!({ "fields": errors })),
            ShiplineError::NotFound { resource, key } => Some(serde_json::json!({
                "resource": resource,
                "key": key,
            })),
            _ => None,
        }
    }

    /// Shorthand for a not-found error on a named resource
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        ShiplineError::NotFound {
            resource,
            key: key.into(),
        }
    }

    /// Shorthand for a business-rule violation
    pub fn business(message: impl Into<String>) -> Self {
        ShiplineError::Business {
            message: message.into(),
        }
    }

    /// Shorthand for a gateway failure
    pub fn gateway(message: impl Into<String>) -> Self {
        ShiplineError::Gateway {
            message: message.into(),
        }
    }
}

impl IntoResponse for ShiplineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// Storage-layer failures surface with a generic message; the underlying
/// cause stays in the logs.
impl From<anyhow::Error> for ShiplineError {
    fn from(err: anyhow::Error) -> Self {
        ShiplineError::Storage {
            message: err.to_string(),
        }
    }
}

/// A specialized Result type for shipline operations
pub type ShiplineResult<T> = Result<T, ShiplineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ShiplineError::not_found("Product", "abc-123");
        assert!(err.to_string().contains("Product"));
        assert!(err.to_string().contains("abc-123"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_status_codes_match_contract() {
        assert_eq!(
            ShiplineError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShiplineError::InvalidPayload {
                message: "bad json".to_string()
            }
            .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ShiplineError::business("Order is already cancelled.").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShiplineError::gateway("Failed to create shipment.").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ShiplineError::Storage {
                message: "connection reset".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_details() {
        let err = ShiplineError::Validation(vec![
            FieldValidationError {
                field: "quantity".to_string(),
                message: "must be at least 1".to_string(),
            },
            FieldValidationError {
                field: "price".to_string(),
                message: "must be non-negative".to_string(),
            },
        ]);
        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.expect("details present");
        assert_eq!(details["fields"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_storage_message_is_generic() {
        let err: ShiplineError = anyhow::anyhow!("password=s3cret host=db1").into();
        let response = err.to_response();
        assert_eq!(response.code, "STORAGE_ERROR");
        assert!(!response.message.contains("s3cret"));
    }
}
