// Internal domain types shared across layers
pub mod account;
pub mod auth;
pub mod context;
