use std::fmt;

use poem_openapi::ApiResponse;
use poem_openapi::payload::Json;

use super::error_body;
use crate::errors::internal::{
    AccountError, CredentialError, InternalError, PaymentError, PolicyError, UploadError,
};
use crate::types::dto::common::ErrorResponse;

/// Errors returned by the directory, registration and profile endpoints
#[derive(ApiResponse, Debug)]
pub enum DirectoryError {
    /// Empty body, missing field, malformed extra field or unknown religion/cast
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    /// Missing, invalid or expired bearer token
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Registration is payment-gated and the proof is missing, does not verify or was already used
    #[oai(status = 402)]
    PaymentRequired(Json<ErrorResponse>),

    /// Role not assignable, record outside the caller's scope, or caller not staff
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Account absent or not visible to the caller
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Email or username already taken
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),

    /// Payment verification needed but no payment credentials are configured
    #[oai(status = 503)]
    ServiceUnavailable(Json<ErrorResponse>),
}

impl DirectoryError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        DirectoryError::BadRequest(error_body("validation_failed", message, 400))
    }

    pub fn unauthorized(error: &str, message: impl Into<String>) -> Self {
        DirectoryError::Unauthorized(error_body(error, message, 401))
    }

    pub fn not_found(key: &str) -> Self {
        DirectoryError::NotFound(error_body(
            "not_found",
            format!("Account '{}' not found", key),
            404,
        ))
    }

    fn forbidden(message: impl Into<String>) -> Self {
        DirectoryError::Forbidden(error_body("forbidden", message, 403))
    }

    fn conflict(message: impl Into<String>) -> Self {
        DirectoryError::Conflict(error_body("conflict", message, 409))
    }

    fn internal_server_error() -> Self {
        DirectoryError::InternalError(error_body("internal_error", "An internal error occurred", 500))
    }

    fn upload_failed() -> Self {
        DirectoryError::InternalError(error_body("upload_failed", "Storing the uploaded file failed", 500))
    }

    /// Convert InternalError to DirectoryError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Infrastructure details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(_) => {
                tracing::error!("Database error in directory operation: {}", err);
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

            InternalError::Validation(e) => Self::bad_request(e.to_string()),
            InternalError::Upload(UploadError::Rejected(reason)) => {
                DirectoryError::BadRequest(error_body("invalid_upload", reason.clone(), 400))
            }
            InternalError::Upload(_) => {
                tracing::error!("Upload storage error: {}", err);
                Self::upload_failed()
            }

            InternalError::Account(AccountError::NotFound(key)) => Self::not_found(key),
            InternalError::Account(AccountError::DuplicateEmail(_)) => {
                Self::conflict("An account with this email already exists")
            }
            InternalError::Account(AccountError::DuplicateUsername(_)) => {
                Self::conflict("An account with this username already exists")
            }
            InternalError::Account(AccountError::SuperAdminExists) => {
                Self::conflict("A super-admin account already exists")
            }

            InternalError::Credential(CredentialError::ExpiredToken(_)) => {
                Self::unauthorized("expired_token", "JWT has expired")
            }
            InternalError::Credential(CredentialError::PasswordHashingFailed(_)) => {
                tracing::error!("Password hashing failed: {}", err);
                Self::internal_server_error()
            }
            InternalError::Credential(CredentialError::InvalidCredentials) => {
                Self::unauthorized("invalid_credentials", "Invalid email or password")
            }
            InternalError::Credential(_) => Self::unauthorized("invalid_token", "Invalid or missing bearer token"),

            InternalError::Policy(PolicyError::ActorNotFound { actor_id }) => {
                tracing::warn!("Token subject {} has no stored account", actor_id);
                Self::unauthorized("invalid_token", "Account no longer exists")
            }
            InternalError::Policy(PolicyError::NotVisible { .. }) => Self::not_found("requested"),
            InternalError::Policy(PolicyError::NotStaff { .. }) => {
                Self::forbidden("Your role cannot manage accounts")
            }
            InternalError::Policy(PolicyError::RoleNotAssignable { requested, .. }) => {
                Self::forbidden(format!("You may not assign the role '{}'", requested))
            }
            InternalError::Policy(PolicyError::OutOfScope) => {
                Self::forbidden("Account must stay within your religion and cast")
            }

            InternalError::Payment(PaymentError::PaymentRequired) => {
                DirectoryError::PaymentRequired(error_body("payment_required", "Payment is required to register", 402))
            }
            InternalError::Payment(PaymentError::InvalidSignature { order_id }) => {
                tracing::warn!("Rejected payment proof for order {}", order_id);
                DirectoryError::PaymentRequired(error_body(
                    "invalid_payment",
                    "Payment could not be verified",
                    402,
                ))
            }
            InternalError::Payment(PaymentError::AlreadyUsed { order_id }) => {
                tracing::warn!("Rejected reused payment order {}", order_id);
                DirectoryError::PaymentRequired(error_body(
                    "payment_already_used",
                    "This payment was already used for a registration",
                    402,
                ))
            }
            InternalError::Payment(PaymentError::NotConfigured) => DirectoryError::ServiceUnavailable(
                error_body("payment_unavailable", "Payments are not configured", 503),
            ),
            InternalError::Payment(_) => {
                tracing::error!("Unexpected payment error in directory operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            DirectoryError::BadRequest(json)
            | DirectoryError::Unauthorized(json)
            | DirectoryError::PaymentRequired(json)
            | DirectoryError::Forbidden(json)
            | DirectoryError::NotFound(json)
            | DirectoryError::Conflict(json)
            | DirectoryError::InternalError(json)
            | DirectoryError::ServiceUnavailable(json) => &json.0,
        }
    }

    /// Get the error code from the error variant
    pub fn error_code(&self) -> &str {
        &self.body().error
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

impl From<InternalError> for DirectoryError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
