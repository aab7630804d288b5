// Data Transfer Objects - API request and response shapes
pub mod account;
pub mod auth;
pub mod common;
pub mod payment;
