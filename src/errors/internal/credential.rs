use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// Unknown email or wrong password; the two cases are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {token_type} - {reason}")]
    InvalidToken {
        token_type: String,
        reason: String,
    },

    #[error("Expired token: {0}")]
    ExpiredToken(String),

    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),
}

impl CredentialError {
    /// Create an invalid token error
    pub fn invalid_token(token_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            token_type: token_type.into(),
            reason: reason.into(),
        }
    }
}
