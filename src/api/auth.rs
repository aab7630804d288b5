use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, SecurityScheme, Tags, auth::Bearer, payload::Json};

use crate::api::helpers::authenticated_context;
use crate::coordinators::{DirectoryCoordinator, LoginCoordinator};
use crate::errors::AuthError;
use crate::types::dto::account::{AccountResponse, account_response};
use crate::types::dto::auth::{LoginRequest, TokenResponse};
use crate::types::internal::context::RequestContext;

/// Authentication API endpoints
pub struct AuthApi {
    login_coordinator: Arc<LoginCoordinator>,
    directory_coordinator: Arc<DirectoryCoordinator>,
}

impl AuthApi {
    pub fn new(login_coordinator: Arc<LoginCoordinator>, directory_coordinator: Arc<DirectoryCoordinator>) -> Self {
        Self {
            login_coordinator,
            directory_coordinator,
        }
    }
}

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with email and password to receive an access token
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, req: &Request, body: Json<LoginRequest>) -> Result<Json<TokenResponse>, AuthError> {
        let ctx = RequestContext::for_api(req);
        let body = body.0;

        let issued = self
            .login_coordinator
            .login(&ctx, body.email, body.password)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(TokenResponse {
            access_token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
        }))
    }

    /// The caller's own account
    #[oai(path = "/whoami", method = "get", tag = "AuthTags::Authentication")]
    async fn whoami(&self, req: &Request, auth: BearerAuth) -> Result<Json<AccountResponse>, AuthError> {
        let ctx = authenticated_context(req, &auth, &self.login_coordinator)
            .map_err(AuthError::from_internal_error)?;

        let account = self
            .directory_coordinator
            .whoami(&ctx)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(account_response(&account)))
    }
}
