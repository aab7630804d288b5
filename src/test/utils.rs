// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use migration::{DirectoryMigrator, MigratorTrait};
use sea_orm::Database;
use tempfile::TempDir;

use crate::app_data::AppData;
use crate::config::{BootstrapSettings, MockEnvironment, SecretManager};
use crate::types::internal::account::{Account, AccountInput, Role};
use crate::types::internal::auth::Claims;
use crate::types::internal::context::RequestContext;

pub const TEST_SESSION_SECRET: &str = "test-session-secret-at-least-32-characters";
pub const TEST_PASSWORD: &str = "password123";

/// Environment every test AppData is built from; extra pairs override the defaults
pub fn test_environment(upload_dir: &TempDir, extra: &[(&str, &str)]) -> Arc<MockEnvironment> {
    let upload_dir = upload_dir.path().to_str().expect("temp dir is valid UTF-8");
    Arc::new(
        MockEnvironment::empty()
            .with_vars(&[
                ("UPLOAD_DIR", upload_dir),
                ("SESSION_SECRET", TEST_SESSION_SECRET),
                ("PASSWORD_PEPPER", "test-pepper-for-unit-tests"),
            ])
            .with_vars(extra),
    )
}

/// Creates a migrated in-memory database and a full AppData over it
///
/// The returned TempDir holds the upload directory; keep it alive for the test.
pub async fn setup_test_app_data(extra_env: &[(&str, &str)]) -> (Arc<AppData>, TempDir) {
    let uploads = tempfile::tempdir().expect("Failed to create upload dir");
    let env = test_environment(&uploads, extra_env);

    let settings = BootstrapSettings::from_env_provider(env.clone()).expect("Failed to load settings");
    let secrets = SecretManager::from_env_provider(env).expect("Failed to load secrets");

    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    DirectoryMigrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    (Arc::new(AppData::new(db, settings, secrets)), uploads)
}

/// Account input with a username derived from the first name and the shared test password
pub fn account_input(first_name: &str, email: &str, role: Role, group: Option<(&str, &str)>) -> AccountInput {
    AccountInput {
        first_name: Some(first_name.to_string()),
        email: Some(email.to_string()),
        username: Some(first_name.to_lowercase()),
        role: Some(role),
        password: Some(TEST_PASSWORD.to_string()),
        religion: group.map(|(religion, _)| religion.to_string()),
        cast: group.map(|(_, cast)| cast.to_string()),
        ..Default::default()
    }
}

/// Insert an account directly, bypassing the visibility policy
pub async fn seed_account(app_data: &AppData, input: AccountInput) -> Account {
    let provider = &app_data.providers.account_provider;
    let attributes = provider
        .prepare_new(&input)
        .await
        .expect("Failed to prepare seed account");
    provider
        .create(&RequestContext::for_system("seed"), attributes, None)
        .await
        .expect("Failed to insert seed account")
}

/// Authenticated context for `account` without going through a token
pub fn caller_context(account: &Account) -> RequestContext {
    RequestContext::for_system("test").with_auth(Claims {
        sub: account.id.to_string(),
        role: account.role(),
        exp: 0,
        iat: 0,
        jti: "test-jti".to_string(),
    })
}
