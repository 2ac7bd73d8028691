//! Typed error handling for the API
//!
//! Every failure a handler can produce is a variant of [`ApiError`], which
//! knows its HTTP status and a stable machine-readable code. Database-driver
//! categories map to fixed responses (not-found → 404, validation and
//! duplicate-key → 400); everything else falls through to a generic 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The error type shared by all handlers.
#[derive(Debug)]
pub enum ApiError {
    /// An entity lookup came back empty.
    NotFound { resource: &'static str, id: Uuid },

    /// Request payload failed validation.
    Validation(Vec<FieldError>),

    /// Request body could not be parsed at all.
    InvalidBody { message: String },

    /// A unique field collided with an existing document.
    Duplicate { field: &'static str },

    /// Missing, malformed, or rejected credentials.
    Unauthorized { message: String },

    /// Authenticated but not allowed.
    Forbidden { message: String },

    /// Storage backend failure. Logged, never surfaced verbatim.
    Storage(anyhow::Error),
}

/// A single field validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound { resource, id } => {
                write!(f, "{} with id '{}' not found", resource, id)
            }
            ApiError::Validation(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation failed: {}", msgs.join(", "))
            }
            ApiError::InvalidBody { message } => write!(f, "Invalid request body: {}", message),
            ApiError::Duplicate { field } => {
                write!(f, "A record with this {} already exists", field)
            }
            ApiError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            ApiError::Storage(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Storage(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Error body sent to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable code for programmatic handling
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Per-field details for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Convenience constructor for not-found results.
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        ApiError::NotFound { resource, id }
    }

    /// Convenience constructor for 401 responses.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
        }
    }

    /// Convenience constructor for 403 responses.
    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            ApiError::Duplicate { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidBody { .. } => "INVALID_BODY",
            ApiError::Duplicate { .. } => "DUPLICATE_KEY",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to the client-facing error body.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: match self {
                ApiError::Validation(errors) => Some(serde_json::json!({ "fields": errors })),
                _ => None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(err) = &self {
            tracing::error!(error = %err, "storage error");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter()
                    .map(|e| FieldError {
                        field: field.to_string(),
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string()),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        ApiError::Validation(fields)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Stores wrap typed errors (e.g. a duplicate-key hit) in anyhow;
        // unwrap them here so they keep their status mapping.
        match err.downcast::<ApiError>() {
            Ok(api) => api,
            Err(other) => ApiError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::not_found("order", Uuid::nil());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("order"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn duplicate_maps_to_400() {
        let err = ApiError::Duplicate { field: "email" };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn auth_status_codes() {
        assert_eq!(
            ApiError::unauthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::forbidden("admins only").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn storage_hides_internals() {
        let err = ApiError::Storage(anyhow::anyhow!("connection refused to 10.0.0.3"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn validation_response_carries_fields() {
        let err = ApiError::Validation(vec![FieldError {
            field: "phone".to_string(),
            message: "invalid phone format".to_string(),
        }]);
        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.expect("details should be present");
        assert_eq!(details["fields"][0]["field"], "phone");
    }

    #[test]
    fn from_anyhow_unwraps_typed_errors() {
        let wrapped = anyhow::Error::new(ApiError::Duplicate { field: "email" });
        let err: ApiError = wrapped.into();
        assert!(matches!(err, ApiError::Duplicate { field: "email" }));

        let plain: ApiError = anyhow::anyhow!("boom").into();
        assert!(matches!(plain, ApiError::Storage(_)));
    }

    #[test]
    fn from_validator_errors() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 6, message = "too short"))]
            password: String,
        }

        let probe = Probe {
            password: "abc".to_string(),
        };
        let err: ApiError = probe.validate().unwrap_err().into();
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields[0].field, "password");
                assert_eq!(fields[0].message, "too short");
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }
}
