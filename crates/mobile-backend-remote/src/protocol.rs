//! Wire protocol for the backend's login route.

use mobile_backend_core::UserIdentity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the backend protocol version.
pub const API_VERSION_HEADER: &str = "ZUMO-API-VERSION";

/// Protocol version sent on every request.
pub const API_VERSION: &str = "2.0.0";

/// Body of a client-directed login request.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    /// Access token issued by the identity provider.
    pub access_token: &'a str,
}

/// Body of a successful login response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub authentication_token: String,
    pub user: LoginUser,
}

/// User section of a login response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub user_id: String,
}

impl From<LoginResponse> for UserIdentity {
    fn from(response: LoginResponse) -> Self {
        Self::new(response.user.user_id, response.authentication_token)
    }
}

/// Extract a human-readable message from an error response body.
///
/// Prefers a JSON `error` or `message` field, then the raw body text.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return Some(msg.clone());
            }
        }
    }
    Some(body.to_string())
}
