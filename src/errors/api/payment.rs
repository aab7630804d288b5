use std::fmt;

use poem_openapi::ApiResponse;
use poem_openapi::payload::Json;

use super::error_body;
use crate::errors::internal::{InternalError, PaymentError};
use crate::types::dto::common::ErrorResponse;

/// Errors returned by the payment order endpoint
#[derive(ApiResponse, Debug)]
pub enum PaymentApiError {
    /// Registration fee does not fit the provider amount
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),

    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),

    /// The payment provider failed or rejected the order
    #[oai(status = 502)]
    BadGateway(Json<ErrorResponse>),

    /// No payment credentials configured
    #[oai(status = 503)]
    ServiceUnavailable(Json<ErrorResponse>),
}

impl PaymentApiError {
    /// Convert InternalError to PaymentApiError
    ///
    /// Provider response bodies are logged, never relayed.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Validation(e) => {
                PaymentApiError::BadRequest(error_body("validation_failed", e.to_string(), 400))
            }
            InternalError::Payment(PaymentError::NotConfigured) => PaymentApiError::ServiceUnavailable(
                error_body("payment_unavailable", "Payments are not configured", 503),
            ),
            InternalError::Payment(PaymentError::Request(_)) | InternalError::Payment(PaymentError::Provider { .. }) => {
                tracing::error!("Payment provider failure: {}", err);
                PaymentApiError::BadGateway(error_body("payment_provider_error", "Error creating payment order", 502))
            }
            _ => {
                tracing::error!("Unexpected error in payment operation: {}", err);
                PaymentApiError::InternalError(error_body("internal_error", "An internal error occurred", 500))
            }
        }
    }

    fn body(&self) -> &ErrorResponse {
        match self {
            PaymentApiError::BadRequest(json)
            | PaymentApiError::InternalError(json)
            | PaymentApiError::BadGateway(json)
            | PaymentApiError::ServiceUnavailable(json) => &json.0,
        }
    }

    pub fn message(&self) -> String {
        self.body().message.clone()
    }

    pub fn status_code(&self) -> u16 {
        self.body().status_code
    }
}

impl From<InternalError> for PaymentApiError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}

impl fmt::Display for PaymentApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
