// API layer - HTTP endpoints
pub mod auth;
pub mod health;
pub mod helpers;
pub mod payment;
pub mod public;
pub mod users;

use std::sync::Arc;

use poem_openapi::OpenApiService;

pub use auth::AuthApi;
pub use health::HealthApi;
pub use payment::PaymentApi;
pub use public::PublicApi;
pub use users::UsersApi;

use crate::app_data::AppData;
use crate::coordinators::{DirectoryCoordinator, LoginCoordinator, PaymentCoordinator, RegistrationCoordinator};

pub type DirectoryApis = (HealthApi, AuthApi, UsersApi, PublicApi, PaymentApi);

/// Build every API object over shared coordinators
///
/// `server_url` is the externally visible base the OpenAPI document advertises.
pub fn build_api_service(app_data: Arc<AppData>, server_url: &str) -> OpenApiService<DirectoryApis, ()> {
    let directory_coordinator = Arc::new(DirectoryCoordinator::new(app_data.clone()));
    let login_coordinator = Arc::new(LoginCoordinator::new(app_data.clone()));
    let registration_coordinator = Arc::new(RegistrationCoordinator::new(app_data.clone()));
    let payment_coordinator = Arc::new(PaymentCoordinator::new(app_data));

    let apis = (
        HealthApi,
        AuthApi::new(login_coordinator.clone(), directory_coordinator.clone()),
        UsersApi::new(directory_coordinator.clone(), login_coordinator),
        PublicApi::new(directory_coordinator, registration_coordinator),
        PaymentApi::new(payment_coordinator),
    );

    OpenApiService::new(apis, "Directory API", env!("CARGO_PKG_VERSION")).server(server_url)
}
