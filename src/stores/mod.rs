// Stores layer - Data access and repository pattern
pub mod account_store;
pub mod upload_store;

pub use account_store::AccountStore;
pub use upload_store::UploadStore;
