//! HTTP plumbing shared by every agents operation: client construction,
//! headers and error mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};

use crate::error::{ErrorCode, ErrorDetails, FoundryError};

pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";
const SERVICE_REQUEST_ID_HEADERS: [&str; 2] = ["x-ms-request-id", "apim-request-id"];

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, FoundryError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .user_agent(concat!("foundry-agents/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Bearer auth, JSON content type and a fresh client request id.
pub fn request_headers(token: &str) -> Result<(HeaderMap, String), FoundryError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
        FoundryError::Authentication("access token contains invalid header characters".into())
    })?;
    headers.insert(AUTHORIZATION, auth);

    let request_id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(CLIENT_REQUEST_ID_HEADER, value);
    }
    Ok((headers, request_id))
}

/// Map a non-success response to a [`FoundryError`].
///
/// 429 becomes `RateLimited` (honouring `Retry-After`); every other status
/// is an `Api` error carrying whatever `{"error": {...}}` details the body has.
pub fn status_to_error(status: u16, headers: &HeaderMap, body: &str) -> FoundryError {
    if status == 429 {
        return FoundryError::RateLimited {
            retry_after_ms: retry_after_ms(headers, body),
        };
    }

    let request_id = SERVICE_REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match parse_error_body(body) {
        Some(ServiceError {
            code,
            message,
            param,
        }) => {
            let message = message.unwrap_or_else(|| body.to_string());
            let details = ErrorDetails {
                code: code.as_deref().map(ErrorCode::from_service_code),
                service_code: code,
                param,
                request_id,
            };
            FoundryError::api_with_details(status, message, details)
        }
        None => {
            let message = if body.trim().is_empty() {
                default_reason(status)
            } else {
                body.to_string()
            };
            match request_id {
                Some(request_id) => FoundryError::api_with_details(
                    status,
                    message,
                    ErrorDetails {
                        code: None,
                        service_code: None,
                        param: None,
                        request_id: Some(request_id),
                    },
                ),
                None => FoundryError::api(status, message),
            }
        }
    }
}

struct ServiceError {
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

fn parse_error_body(body: &str) -> Option<ServiceError> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let text = |key: &str| error.get(key).and_then(|v| v.as_str()).map(str::to_string);
    Some(ServiceError {
        code: text("code"),
        message: text("message"),
        param: text("param"),
    })
}

fn default_reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unexpected status")
        .to_string()
}

fn retry_after_ms(headers: &HeaderMap, body: &str) -> Option<u64> {
    let from_header = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64);
    from_header.or_else(|| {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("retry_after"))
                    .and_then(|r| r.as_f64())
                    .map(|s| (s * 1000.0) as u64)
            })
    })
}
