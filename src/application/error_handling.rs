// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors → user-friendly responses
// - Provides consistent error format for UI
// - Auth and store rejections keep the remote message; it is what the user sees
// - Logs errors for debugging

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Resource not found (404)
    NotFound,

    /// Invalid input/validation error (400)
    Validation,

    /// Domain invariant violation (422)
    DomainError,

    /// Missing or rejected credentials (401)
    Authentication,

    /// Local storage failure (500)
    Storage,

    /// Remote API or transport error (502)
    ExternalService,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::new(ErrorType::NotFound, "Resource not found", None),

            AppError::Domain(domain_error) => Self::new(
                ErrorType::DomainError,
                "Domain validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Unauthenticated => Self::new(
                ErrorType::Authentication,
                "You must be signed in to do that",
                None,
            ),

            AppError::Auth { status, message } => {
                log::warn!("Auth provider rejected request ({}): {}", status, message);
                Self::new(ErrorType::Authentication, message, Some(status.to_string()))
            }

            AppError::Api { status, message } => {
                log::error!("Remote API error ({}): {}", status, message);
                Self::new(ErrorType::ExternalService, message, Some(status.to_string()))
            }

            AppError::Http(http_error) => {
                log::error!("HTTP error: {:?}", http_error);
                Self::new(
                    ErrorType::ExternalService,
                    "Network request failed",
                    Some(http_error.to_string()),
                )
            }

            AppError::Database(db_error) => {
                // Log full error for debugging
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Storage,
                    "Local storage operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Storage, "Local storage unavailable", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::Storage,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    /// Create validation error
    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "Internal error".to_string())
    }
}

/// Helper trait to convert Results to ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| ErrorResponse::from_app_error(e).to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = ErrorResponse::from_app_error(AppError::NotFound);
        assert_eq!(error.error_type, ErrorType::NotFound);
        assert_eq!(error.message, "Resource not found");
    }

    #[test]
    fn test_auth_error_keeps_provider_message() {
        let error = ErrorResponse::from_app_error(AppError::auth(400, "Invalid login credentials"));
        assert_eq!(error.error_type, ErrorType::Authentication);
        assert_eq!(error.message, "Invalid login credentials");
        assert_eq!(error.details.as_deref(), Some("400"));
    }

    #[test]
    fn test_validation_error() {
        let error = ErrorResponse::validation("Invalid input".to_string());
        assert_eq!(error.error_type, ErrorType::Validation);
        assert_eq!(error.message, "Invalid input");
    }

    #[test]
    fn test_serialization() {
        let result: Result<(), AppError> = Err(AppError::Unauthenticated);
        let json = result.to_error_response().unwrap_err();
        assert!(json.contains("authentication"));
        assert!(!json.contains("\"success\":true"));

        let json = ErrorResponse::not_found("Movie").to_json();
        assert!(json.contains("not_found"));
        assert!(json.contains("Movie not found"));
    }
}
