use std::fmt;

use poem_openapi::ApiResponse;
use poem_openapi::payload::Json;

use super::error_body;
use crate::errors::internal::{CredentialError, InternalError, PolicyError};
use crate::types::dto::common::ErrorResponse;

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[oai(status = 401)]
    InvalidCredentials(Json<ErrorResponse>),

    /// Invalid or malformed JWT
    #[oai(status = 401)]
    InvalidToken(Json<ErrorResponse>),

    /// JWT has expired
    #[oai(status = 401)]
    ExpiredToken(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AuthError {
    /// Create an InvalidCredentials error; never says which half was wrong
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(error_body("invalid_credentials", "Invalid email or password", 401))
    }

    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(error_body("invalid_token", "Invalid or malformed JWT", 401))
    }

    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(error_body("expired_token", "JWT has expired", 401))
    }

    fn internal_server_error() -> Self {
        AuthError::InternalError(error_body("internal_error", "An internal error occurred", 500))
    }

    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Credential(CredentialError::InvalidCredentials) => Self::invalid_credentials(),
            InternalError::Credential(CredentialError::ExpiredToken(_)) => Self::expired_token(),
            InternalError::Credential(CredentialError::MissingToken)
            | InternalError::Credential(CredentialError::InvalidToken { .. }) => Self::invalid_token(),
            InternalError::Policy(PolicyError::ActorNotFound { actor_id }) => {
                tracing::warn!("Token subject {} has no stored account", actor_id);
                Self::invalid_token()
            }
            InternalError::Database(_) => {
                tracing::error!("Database error in auth operation: {}", err);
                Self::internal_server_error()
            }
            InternalError::Parse { value_type, .. } => {
                tracing::error!("Parse error for {}: {}", value_type, err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }
            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            AuthError::InvalidCredentials(json)
            | AuthError::InvalidToken(json)
            | AuthError::ExpiredToken(json)
            | AuthError::InternalError(json) => &json.0,
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.body().message.clone()
    }

    /// Get the HTTP status code from the error variant
    pub fn status_code(&self) -> u16 {
        self.body().status_code
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
