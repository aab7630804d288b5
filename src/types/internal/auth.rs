use serde::{Deserialize, Serialize};

use crate::types::internal::account::Role;

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id, decimal string)
    pub sub: String,

    /// Role at the time the token was issued
    pub role: Role,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID for log correlation
    pub jti: String,
}

impl Claims {
    /// Parse the subject back into an account id
    pub fn account_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}
