use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    /// Looked up by id or username
    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("A super-admin account already exists")]
    SuperAdminExists,
}
