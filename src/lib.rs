// Library exports for integration tests and the binary

pub mod api;
pub mod app_data;
pub mod cli;
pub mod config;
pub mod coordinators;
pub mod errors;
pub mod policy;
pub mod providers;
pub mod stores;
pub mod types;

#[cfg(test)]
pub mod test;

pub use app_data::AppData;
