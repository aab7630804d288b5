use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{BootstrapSettings, SecretManager};
use crate::providers::{
    AccountProvider, AuthenticationProvider, CryptoProvider, PaymentProvider, TokenProvider,
};
use crate::stores::{AccountStore, UploadStore};

/// Stores created once from the shared connection
pub struct Stores {
    pub account_store: Arc<AccountStore>,
    pub upload_store: Arc<UploadStore>,
}

/// Providers wired over the shared stores and secrets
pub struct Providers {
    pub account_provider: Arc<AccountProvider>,
    pub authentication_provider: Arc<AuthenticationProvider>,
    pub crypto_provider: Arc<CryptoProvider>,
    pub payment_provider: Arc<PaymentProvider>,
    pub token_provider: Arc<TokenProvider>,
}

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓ init_database + migrate_database
/// AppData::new(db, settings, secrets)
///   ├─ stores    (AccountStore, UploadStore)
///   └─ providers (Account, Authentication, Crypto, Payment, Token)
///   ↓ wrapped in Arc<AppData>
///   ├─ DirectoryCoordinator::new(app_data)
///   ├─ LoginCoordinator::new(app_data)
///   ├─ RegistrationCoordinator::new(app_data)
///   └─ PaymentCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub db: DatabaseConnection,
    pub settings: Arc<BootstrapSettings>,
    pub secret_manager: Arc<SecretManager>,
    pub stores: Stores,
    pub providers: Providers,
}

impl AppData {
    /// Build stores and providers over an already migrated connection
    pub fn new(db: DatabaseConnection, settings: BootstrapSettings, secret_manager: SecretManager) -> Self {
        tracing::info!("Initializing AppData...");
        let settings = Arc::new(settings);
        let secret_manager = Arc::new(secret_manager);

        tracing::debug!("Creating stores...");
        let stores = Stores {
            account_store: Arc::new(AccountStore::new(db.clone())),
            upload_store: Arc::new(UploadStore::new(settings.upload_dir())),
        };

        tracing::debug!("Creating providers...");
        let crypto_provider = Arc::new(CryptoProvider::new(secret_manager.password_pepper()));
        let providers = Providers {
            account_provider: Arc::new(AccountProvider::new(
                stores.account_store.clone(),
                stores.upload_store.clone(),
                crypto_provider.clone(),
            )),
            authentication_provider: Arc::new(AuthenticationProvider::new(
                stores.account_store.clone(),
                crypto_provider.clone(),
            )),
            payment_provider: Arc::new(PaymentProvider::new(
                secret_manager.payment_keys().cloned(),
                crypto_provider.clone(),
                settings.registration_fee(),
                settings.payment_currency(),
            )),
            token_provider: Arc::new(TokenProvider::new(secret_manager.clone())),
            crypto_provider,
        };

        tracing::info!(
            payments = providers.payment_provider.is_configured(),
            "AppData initialization complete"
        );

        Self {
            db,
            settings,
            secret_manager,
            stores,
            providers,
        }
    }
}
