// API-facing error types
pub mod auth;
pub mod directory;
pub mod payment;


pub use auth::AuthError;
pub use directory::DirectoryError;
pub use payment::PaymentApiError;

use poem_openapi::payload::Json;

use crate::types::dto::common::ErrorResponse;

pub(crate) fn error_body(error: &str, message: impl Into<String>, status_code: u16) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code,
    })
}
