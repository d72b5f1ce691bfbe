//! API response types and wrappers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
///
/// Success responses carry `data`; failures carry a structured `error`
/// body with a machine-readable code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,

    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
            timestamp: Utc::now(),
        }
    }

    /// Check if the response is successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Extract the data, consuming the response
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Structured error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code for client-side handling (e.g. `TOKEN_REVOKED`)
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

/// Error codes emitted by the authentication core
pub mod error_codes {
    /// Token failed cryptographic or temporal validation
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    /// Token was deliberately revoked before its natural expiry
    pub const TOKEN_REVOKED: &str = "TOKEN_REVOKED";
    /// Rate limit exceeded for the current window
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    /// Missing or unusable credentials
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    /// Unexpected server-side failure
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = ApiResponse::success(42);
        assert!(response.is_success());
        assert_eq!(response.into_data(), Some(42));
    }

    #[test]
    fn test_error_response_serialization() {
        let response: ApiResponse<()> =
            ApiResponse::error(error_codes::RATE_LIMITED, "Too many requests");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
        assert_eq!(json["error"]["message"], "Too many requests");
        assert!(json.get("data").is_none());
    }
}
