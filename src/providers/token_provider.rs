use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::internal::account::Account;
use crate::types::internal::auth::Claims;
use crate::types::internal::context::RequestContext;

/// Issues and validates HS256 access tokens
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    jwt_expiration_minutes: i64,
}

impl TokenProvider {
    pub fn new(secret_manager: Arc<SecretManager>) -> Self {
        Self {
            secret_manager,
            jwt_expiration_minutes: 60,
        }
    }

    /// Lifetime of an access token in seconds
    pub fn expires_in(&self) -> i64 {
        self.jwt_expiration_minutes * 60
    }

    /// Generate a JWT for an account
    ///
    /// # Returns
    /// * `(token, jti)` - encoded JWT and its unique id
    pub fn generate_jwt(&self, ctx: &RequestContext, account: &Account) -> Result<(String, String), InternalError> {
        let now = Utc::now().timestamp();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: account.id.to_string(),
            role: account.role(),
            exp: now + self.expires_in(),
            iat: now,
            jti: jti.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.session_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", format!("Failed to generate JWT: {}", e)))?;

        tracing::info!(
            request_id = %ctx.request_id,
            account_id = account.id,
            jti = %jti,
            "Issued access token"
        );

        Ok((token, jti))
    }

    /// Validate a JWT and return its claims
    ///
    /// # Errors
    /// * `CredentialError::ExpiredToken` - signature valid but `exp` has passed
    /// * `CredentialError::InvalidToken` - anything else
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, InternalError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.session_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => CredentialError::ExpiredToken("jwt".to_string()).into(),
            _ => {
                tracing::warn!(error = %e, "Rejected access token");
                CredentialError::invalid_token("jwt", "invalid signature or malformed").into()
            }
        })
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("secret_manager", &"<redacted>")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .finish()
    }
}

impl fmt::Display for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenProvider {{ jwt_expiration: {}min }}", self.jwt_expiration_minutes)
    }
}
