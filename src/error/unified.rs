//! Unified error classification and recovery.

use serde::{Deserialize, Serialize};

/// Machine-readable error code, normalized from the service's `error.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    NotFound,
    Unauthorized,
    QuotaExceeded,
    RateLimitExceeded,
    ModelNotFound,
    ServerError,
    ServiceUnavailable,
    Timeout,
    Unknown,
}

impl ErrorCode {
    /// Map a service error code string to a known code.
    pub fn from_service_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "invalid_request_error" | "invalidrequest" | "badrequest" | "invalid_argument"
            | "invalid_value" => Self::InvalidRequest,
            "not_found" | "notfound" | "resourcenotfound" => Self::NotFound,
            "unauthorized" | "authenticationfailed" | "invalidauthenticationtoken" => {
                Self::Unauthorized
            }
            "quota_exceeded" | "insufficient_quota" | "quotaexceeded" => Self::QuotaExceeded,
            "rate_limit_exceeded" | "too_many_requests" | "toomanyrequests" => {
                Self::RateLimitExceeded
            }
            "model_not_found" | "deploymentnotfound" | "invalid_model" => Self::ModelNotFound,
            "server_error" | "internal_error" | "internalservererror" => Self::ServerError,
            "service_unavailable" | "serviceunavailable" => Self::ServiceUnavailable,
            "timeout" | "gatewaytimeout" => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    NotFound,
    Api,
    Configuration,
    Validation,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Structured details returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: Option<ErrorCode>,
    pub service_code: Option<String>,
    pub param: Option<String>,
    pub request_id: Option<String>,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    CheckToolDefinitions,
    CheckResourceId,
    IncreaseTimeout,
    CheckToolImplementation,
    ContactSupport,
}
