// Providers layer - Work performers and business logic
//
// Providers contain business logic and provide composable operations that
// coordinators can orchestrate. They perform actual work like hashing,
// validation, token handling and store access.

pub mod account_provider;
pub mod authentication_provider;
pub mod crypto_provider;
pub mod payment_provider;
pub mod token_provider;

pub use account_provider::AccountProvider;
pub use authentication_provider::AuthenticationProvider;
pub use crypto_provider::CryptoProvider;
pub use payment_provider::PaymentProvider;
pub use token_provider::TokenProvider;
