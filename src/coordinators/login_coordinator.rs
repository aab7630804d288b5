use std::sync::Arc;

use crate::app_data::AppData;
use crate::errors::InternalError;
use crate::providers::authentication_provider::LoginRequest;
use crate::providers::{AuthenticationProvider, TokenProvider};
use crate::types::internal::account::Account;
use crate::types::internal::context::RequestContext;

/// A freshly issued access token
#[derive(Debug)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
    pub account: Account,
}

pub struct LoginCoordinator {
    authentication_provider: Arc<AuthenticationProvider>,
    token_provider: Arc<TokenProvider>,
}

impl LoginCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            authentication_provider: Arc::clone(&app_data.providers.authentication_provider),
            token_provider: Arc::clone(&app_data.providers.token_provider),
        }
    }

    /// Get a reference to the internal TokenProvider
    ///
    /// The API layer validates bearer tokens with it before building an authenticated context.
    pub fn token_provider(&self) -> Arc<TokenProvider> {
        self.token_provider.clone()
    }

    /// Verify credentials and issue a JWT
    ///
    /// # Errors
    /// * `CredentialError::InvalidCredentials` - unknown email or wrong password
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: String,
        password: String,
    ) -> Result<IssuedToken, InternalError> {
        let account = match self
            .authentication_provider
            .verify_credential(LoginRequest { email, password })
            .await
        {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!(request_id = %ctx.request_id, ip = ?ctx.ip_address, "Login failed");
                return Err(e);
            }
        };

        let (access_token, _jti) = self.token_provider.generate_jwt(ctx, &account)?;

        Ok(IssuedToken {
            access_token,
            expires_in: self.token_provider.expires_in(),
            account,
        })
    }

    /// Attach validated claims to a request context
    ///
    /// # Errors
    /// * `CredentialError::InvalidToken` / `CredentialError::ExpiredToken`
    pub fn authenticate(&self, ctx: RequestContext, token: &str) -> Result<RequestContext, InternalError> {
        let claims = self.token_provider.validate_jwt(token)?;
        Ok(ctx.with_auth(claims))
    }
}
