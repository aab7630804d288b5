use std::sync::Arc;

use poem::Request;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::{OpenApi, Tags};

use crate::coordinators::{DirectoryCoordinator, RegistrationCoordinator};
use crate::errors::DirectoryError;
use crate::policy::groups;
use crate::types::dto::account::{AccountResponse, CreateAccountApiResponse, account_response, GroupResponse, RegisterPayload};
use crate::types::internal::context::RequestContext;

/// Endpoints that need no bearer token
pub struct PublicApi {
    directory_coordinator: Arc<DirectoryCoordinator>,
    registration_coordinator: Arc<RegistrationCoordinator>,
}

impl PublicApi {
    pub fn new(
        directory_coordinator: Arc<DirectoryCoordinator>,
        registration_coordinator: Arc<RegistrationCoordinator>,
    ) -> Self {
        Self {
            directory_coordinator,
            registration_coordinator,
        }
    }
}

#[derive(Tags)]
enum PublicTags {
    /// Sign-up, vocabulary and ID cards
    Public,
}

#[OpenApi]
impl PublicApi {
    /// Religion to cast vocabulary accepted on every account form
    #[oai(path = "/groups", method = "get", tag = "PublicTags::Public")]
    async fn groups(&self) -> Json<Vec<GroupResponse>> {
        Json(
            groups::vocabulary()
                .into_iter()
                .map(|(religion, casts)| GroupResponse {
                    religion: religion.to_string(),
                    casts: casts.iter().map(|cast| cast.to_string()).collect(),
                })
                .collect(),
        )
    }

    /// Read-only ID card for one username
    #[oai(path = "/profile/:username", method = "get", tag = "PublicTags::Public")]
    async fn profile(&self, req: &Request, username: Path<String>) -> Result<Json<AccountResponse>, DirectoryError> {
        let ctx = RequestContext::for_api(req);
        let account = self.directory_coordinator.public_profile(&ctx, &username.0).await?;

        Ok(Json(account_response(&account)))
    }

    /// Self-service registration; the new account is always a plain user
    #[oai(path = "/register", method = "post", tag = "PublicTags::Public")]
    async fn register(&self, req: &Request, body: RegisterPayload) -> Result<CreateAccountApiResponse, DirectoryError> {
        let ctx = RequestContext::for_api(req);
        let (input, proof, image) = body.into_parts().await?;

        let account = self
            .registration_coordinator
            .register(&ctx, input, proof.map(Into::into), image)
            .await?;

        Ok(CreateAccountApiResponse::Created(Json(account_response(&account))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_app_data;
    use crate::types::dto::account::{AccountRequest, RegisterRequest};
    use crate::types::dto::payment::CheckoutProofRequest;
    use crate::types::internal::account::Role;
    use serde_json::json;

    async fn setup(env: &[(&str, &str)]) -> (PublicApi, Arc<crate::app_data::AppData>, tempfile::TempDir) {
        let (app_data, uploads) = setup_test_app_data(env).await;
        let api = PublicApi::new(
            Arc::new(DirectoryCoordinator::new(app_data.clone())),
            Arc::new(RegistrationCoordinator::new(app_data.clone())),
        );
        (api, app_data, uploads)
    }

    fn registration(payment: Option<CheckoutProofRequest>) -> RegisterPayload {
        RegisterPayload::Json(Json(RegisterRequest {
            account: AccountRequest {
                first_name: Some("Asha".to_string()),
                username: Some("asha".to_string()),
                email: Some("asha@example.com".to_string()),
                role: Some(Role::Admin),
                password: Some("s3cret-pass".to_string()),
                religion: Some("Hinduism".to_string()),
                cast: Some("Reddy".to_string()),
                ..Default::default()
            },
            payment,
        }))
    }

    #[tokio::test]
    async fn test_groups_lists_vocabulary() {
        let (api, _app_data, _uploads) = setup(&[]).await;

        let groups = api.groups().await;

        let hinduism = groups.iter().find(|g| g.religion == "Hinduism").unwrap();
        assert!(hinduism.casts.iter().any(|c| c == "Reddy"));
    }

    #[tokio::test]
    async fn test_register_then_view_profile() {
        let (api, _app_data, _uploads) = setup(&[]).await;
        let req = Request::builder().finish();

        let CreateAccountApiResponse::Created(created) = api.register(&req, registration(None)).await.unwrap();
        assert_eq!(created["role"], json!("user"));

        let profile = api.profile(&req, Path("asha".to_string())).await.unwrap();
        assert_eq!(profile["id"], created["id"]);

        let missing = api.profile(&req, Path("nobody".to_string())).await.unwrap_err();
        assert_eq!(missing.status_code(), 404);
    }

    #[tokio::test]
    async fn test_paid_registration_without_proof_is_402() {
        let (api, _app_data, _uploads) = setup(&[
            ("REGISTRATION_REQUIRES_PAYMENT", "true"),
            ("RAZORPAY_KEY_ID", "rzp_test_key"),
            ("RAZORPAY_KEY_SECRET", "rzp_test_secret"),
        ])
        .await;

        let err = api
            .register(&Request::builder().finish(), registration(None))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 402);
    }

    #[tokio::test]
    async fn test_paid_registration_with_valid_proof() {
        let (api, app_data, _uploads) = setup(&[
            ("REGISTRATION_REQUIRES_PAYMENT", "true"),
            ("RAZORPAY_KEY_ID", "rzp_test_key"),
            ("RAZORPAY_KEY_SECRET", "rzp_test_secret"),
        ])
        .await;
        let signature = app_data
            .providers
            .payment_provider
            .expected_signature("order_9", "pay_9")
            .unwrap();

        let proof = CheckoutProofRequest {
            order_id: "order_9".to_string(),
            payment_id: "pay_9".to_string(),
            signature,
        };
        let result = api.register(&Request::builder().finish(), registration(Some(proof))).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_conflict() {
        let (api, _app_data, _uploads) = setup(&[]).await;
        let req = Request::builder().finish();

        api.register(&req, registration(None)).await.unwrap();
        let err = api.register(&req, registration(None)).await.unwrap_err();

        assert_eq!(err.status_code(), 409);
    }
}
