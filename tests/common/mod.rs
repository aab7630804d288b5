// Common test utilities for integration tests

use std::collections::HashMap;
use std::sync::Arc;

use directory_backend::app_data::AppData;
use directory_backend::config::{BootstrapSettings, EnvironmentProvider, SecretManager};
use migration::{DirectoryMigrator, MigratorTrait};
use poem::http::{Method, StatusCode};
use poem::{Endpoint, Request, Route};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;

/// Fixed variables instead of the process environment
pub struct TestEnvironment {
    vars: HashMap<String, String>,
}

impl TestEnvironment {
    pub fn new(upload_dir: &TempDir, extra: &[(&str, &str)]) -> Self {
        let mut vars = HashMap::from([
            ("UPLOAD_DIR".to_string(), upload_dir.path().display().to_string()),
            (
                "SESSION_SECRET".to_string(),
                "integration-session-secret-at-least-32-chars".to_string(),
            ),
            ("PASSWORD_PEPPER".to_string(), "integration-pepper".to_string()),
        ]);
        for (key, value) in extra {
            vars.insert(key.to_string(), value.to_string());
        }
        Self { vars }
    }
}

impl EnvironmentProvider for TestEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Creates a test database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    DirectoryMigrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// The full `/api` router over a fresh database
pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub route: Route,
    _uploads: TempDir,
}

pub async fn setup_test_app(extra_env: &[(&str, &str)]) -> TestApp {
    let uploads = tempfile::tempdir().expect("Failed to create upload dir");
    let env = Arc::new(TestEnvironment::new(&uploads, extra_env));

    let settings = BootstrapSettings::from_env_provider(env.clone()).expect("Failed to load settings");
    let secrets = SecretManager::from_env_provider(env).expect("Failed to load secrets");
    let app_data = Arc::new(AppData::new(setup_test_db().await, settings, secrets));

    let api = directory_backend::api::build_api_service(app_data.clone(), "http://localhost:3000/api");
    let route = Route::new().nest("/api", api);

    TestApp {
        app_data,
        route,
        _uploads: uploads,
    }
}

impl TestApp {
    /// Send a request and return the status with the JSON body (Null when empty)
    pub async fn call(&self, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(path.parse().expect("valid uri"));
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder.content_type("application/json").body(body.to_string()),
            None => builder.finish(),
        };

        let response = self.route.get_response(request).await;
        let status = response.status();
        let bytes = response
            .into_body()
            .into_vec()
            .await
            .expect("readable body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["access_token"].as_str().expect("access token").to_string()
    }
}
