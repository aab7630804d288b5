use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email, matched case-insensitively
    pub email: String,

    pub password: String,
}

/// Response model containing the access token
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,
}
