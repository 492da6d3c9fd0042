//! Data models for API requests and responses.

use serde::{Deserialize, Serialize};

pub const VALIDATION_ERROR: &str = "Validation Error";
pub const NOT_FOUND: &str = "Not Found";
pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const PAYLOAD_TOO_LARGE: &str = "Payload Too Large";
pub const UNSUPPORTED_MEDIA_TYPE: &str = "Unsupported Media Type";
pub const SERVER_ERROR: &str = "Server Error";

/// Body of every non-2xx response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl ErrorBody {
    pub fn new(error: &str, detail: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            detail: detail.into(),
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
