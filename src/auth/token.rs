use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token issued for a set of scopes.
///
/// # Example
/// ```no_run
/// use foundry_agents::auth::AccessToken;
/// use chrono::{Duration, Utc};
///
/// let token = AccessToken::new("eyJ...", Utc::now() + Duration::hours(1));
/// assert!(!token.expires_within(Duration::minutes(5)));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Build from a raw JWT, reading the `exp` claim when present.
    pub fn from_jwt(token: impl Into<String>) -> Self {
        let token = token.into();
        let expires_at = jwt_expiry(&token).unwrap_or_else(|| Utc::now() + Duration::hours(1));
        Self { token, expires_at }
    }

    /// True when the token expires before `margin` has elapsed.
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires_at - Utc::now() < margin
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}
