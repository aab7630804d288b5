use thiserror::Error;

pub mod account;
pub mod credential;
pub mod database;
pub mod payment;
pub mod policy;
pub mod upload;
pub mod validation;

pub use account::AccountError;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use payment::PaymentError;
pub use policy::PolicyError;
pub use upload::UploadError;
pub use validation::ValidationError;

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure errors (database, parse, crypto) are shared by every layer;
/// domain errors carry one enum per concern. Never exposed via the API -
/// endpoints convert explicitly to `DirectoryError`, `AuthError` or `PaymentApiError`.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl InternalError {
    /// Create a database error with context
    pub fn database(operation: &str, source: sea_orm::DbErr) -> Self {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    /// Create a parse error with context
    pub fn parse(value_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            value_type: value_type.into(),
            message: message.into(),
        }
    }

    /// Create a crypto error with context
    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Crypto {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
