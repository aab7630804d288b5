// End-to-end tests through the mounted `/api` router

mod common;

use common::setup_test_app;
use directory_backend::cli::bootstrap::{BootstrapArgs, create_super_admin};
use poem::http::{Method, StatusCode};
use serde_json::{Value, json};

const ROOT_PASSWORD: &str = "root-password-1";

async fn bootstrap(app: &common::TestApp) {
    let args = BootstrapArgs {
        email: "root@example.com".to_string(),
        password: None,
        first_name: "Root".to_string(),
        last_name: None,
        username: Some("root".to_string()),
    };
    create_super_admin(&app.app_data, &args, ROOT_PASSWORD)
        .await
        .expect("bootstrap super-admin");
}

fn account(first_name: &str, email: &str, role: &str, cast: &str) -> Value {
    json!({
        "first_name": first_name,
        "username": first_name.to_lowercase(),
        "email": email,
        "role": role,
        "password": "member-password",
        "religion": "Hinduism",
        "cast": cast,
    })
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|account| account["id"].as_i64().expect("numeric id"))
        .collect()
}

#[tokio::test]
async fn test_role_hierarchy_end_to_end() {
    let app = setup_test_app(&[]).await;
    bootstrap(&app).await;
    let root = app.login("root@example.com", ROOT_PASSWORD).await;

    // Super-admin hands out admin but never plain user
    let (status, admin) = app
        .call(Method::POST, "/api/users", Some(&root), Some(account("Anil", "anil@example.com", "admin", "Reddy")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", admin);
    let (status, _) = app
        .call(Method::POST, "/api/users", Some(&root), Some(account("Uma", "uma@example.com", "user", "Reddy")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = app.login("anil@example.com", "member-password").await;

    let (status, moderator) = app
        .call(
            Method::POST,
            "/api/users",
            Some(&admin_token),
            Some(account("Mohan", "mohan@example.com", "moderator", "Reddy")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, member) = app
        .call(
            Method::POST,
            "/api/users",
            Some(&admin_token),
            Some(account("Ravi", "ravi@example.com", "user", "Reddy")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Outside the admin's own cast
    let (status, _) = app
        .call(
            Method::POST,
            "/api/users",
            Some(&admin_token),
            Some(account("Kiran", "kiran@example.com", "user", "Kamma")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Self-registration lands in another group
    let (status, outsider) = app
        .call(
            Method::POST,
            "/api/register",
            None,
            Some(json!({"account": account("Kiran", "kiran@example.com", "admin", "Kamma")})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", outsider);
    assert_eq!(outsider["role"], json!("user"));

    let (_, listed) = app.call(Method::GET, "/api/users", Some(&root), None).await;
    assert_eq!(ids(&listed), vec![admin["id"].as_i64().unwrap()]);

    let (_, listed) = app.call(Method::GET, "/api/users", Some(&admin_token), None).await;
    assert_eq!(
        ids(&listed),
        vec![moderator["id"].as_i64().unwrap(), member["id"].as_i64().unwrap()]
    );

    let moderator_token = app.login("mohan@example.com", "member-password").await;
    let (_, listed) = app.call(Method::GET, "/api/users", Some(&moderator_token), None).await;
    assert_eq!(ids(&listed), vec![member["id"].as_i64().unwrap()]);

    let hidden = format!("/api/users/{}", outsider["id"]);
    let (status, _) = app.call(Method::GET, &hidden, Some(&moderator_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, roles) = app
        .call(Method::GET, "/api/roles/assignable", Some(&moderator_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles["roles"], json!(["user"]));
}

#[tokio::test]
async fn test_update_then_delete_member() {
    let app = setup_test_app(&[]).await;
    bootstrap(&app).await;
    let root = app.login("root@example.com", ROOT_PASSWORD).await;
    app.call(Method::POST, "/api/users", Some(&root), Some(account("Anil", "anil@example.com", "admin", "Reddy")))
        .await;
    let admin_token = app.login("anil@example.com", "member-password").await;

    let mut body = account("Ravi", "ravi@example.com", "user", "Reddy");
    body["extra_fields"] = json!([{"label": "Village", "value": "Kondapur"}]);
    let (_, member) = app.call(Method::POST, "/api/users", Some(&admin_token), Some(body)).await;
    let path = format!("/api/users/{}", member["id"]);

    let (status, updated) = app
        .call(
            Method::PUT,
            &path,
            Some(&admin_token),
            Some(json!({"last_name": "Kumar", "extra_fields": [{"label": "Phone", "value": 98765}]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["last_name"], json!("Kumar"));
    assert_eq!(updated["first_name"], json!("Ravi"));
    assert_eq!(updated["village"], json!("Kondapur"));
    assert_eq!(updated["phone"], json!(98765));
    assert!(updated.get("extra_fields").is_none());

    // Password untouched by the edit
    app.login("ravi@example.com", "member-password").await;

    let (status, _) = app.call(Method::PUT, &path, Some(&admin_token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call(Method::DELETE, &path, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::DELETE, &path, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_surface() {
    let app = setup_test_app(&[]).await;

    let (status, health) = app.call(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], json!("healthy"));

    let (status, groups) = app.call(Method::GET, "/api/groups", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(groups.as_array().is_some_and(|groups| !groups.is_empty()));

    app.call(
        Method::POST,
        "/api/register",
        None,
        Some(json!({"account": account("Lata", "lata@example.com", "user", "Reddy")})),
    )
    .await;
    let (status, profile) = app.call(Method::GET, "/api/profile/lata", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], json!("lata@example.com"));
    assert!(profile.get("password").is_none());

    let (status, _) = app.call(Method::GET, "/api/profile/nobody", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = setup_test_app(&[]).await;

    let (status, _) = app.call(Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call(Method::GET, "/api/auth/whoami", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "whatever"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_payment_route() {
    let app = setup_test_app(&[]).await;

    let (status, _) = app.call(Method::GET, "/api/payment", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    // No gateway keys configured
    let (status, body) = app.call(Method::POST, "/api/payment", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], json!("payment_unavailable"));
}

#[tokio::test]
async fn test_paid_registration_consumes_the_order() {
    let app = setup_test_app(&[
        ("REGISTRATION_REQUIRES_PAYMENT", "true"),
        ("RAZORPAY_KEY_ID", "rzp_test_key"),
        ("RAZORPAY_KEY_SECRET", "rzp_test_secret"),
    ])
    .await;
    let signature = app
        .app_data
        .providers
        .crypto_provider
        .hmac_sha256_hex("rzp_test_secret", "order_1|pay_1")
        .expect("signature");
    let proof = json!({
        "razorpay_order_id": "order_1",
        "razorpay_payment_id": "pay_1",
        "razorpay_signature": signature,
    });

    let (status, created) = app
        .call(
            Method::POST,
            "/api/register",
            None,
            Some(json!({"account": account("Lata", "lata@example.com", "user", "Reddy"), "payment": proof})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("payment_order_id").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/register",
            None,
            Some(json!({"account": account("Mala", "mala@example.com", "user", "Reddy"), "payment": proof})),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], json!("payment_already_used"));
}
