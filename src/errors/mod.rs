// Errors layer - Error type definitions
pub mod api;
pub mod internal;

// Re-exports for convenience
pub use api::{AuthError, DirectoryError, PaymentApiError};
pub use internal::InternalError;
