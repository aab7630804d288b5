use std::sync::Arc;

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::providers::crypto_provider::CryptoProvider;
use crate::stores::AccountStore;
use crate::types::internal::account::Account;

/// Well-formed argon2id hash with default cost that matches no password.
/// Verified when the account or its hash is missing so every login costs one argon2 run.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verifies email/password pairs against stored accounts
pub struct AuthenticationProvider {
    store: Arc<AccountStore>,
    crypto_provider: Arc<CryptoProvider>,
}

impl AuthenticationProvider {
    pub fn new(store: Arc<AccountStore>, crypto_provider: Arc<CryptoProvider>) -> Self {
        Self { store, crypto_provider }
    }

    /// Return the account on a correct password
    ///
    /// # Errors
    /// * `CredentialError::InvalidCredentials` - unknown email, missing hash or wrong password; never distinguished
    pub async fn verify_credential(&self, creds: LoginRequest) -> Result<Account, InternalError> {
        let Some(account) = self.store.find_by_email(creds.email.trim()).await? else {
            self.burn_verification(&creds.password).await;
            return Err(CredentialError::InvalidCredentials.into());
        };

        let Some(password_hash) = account.attributes.password_hash.as_deref() else {
            tracing::warn!(account_id = account.id, "Login attempt on account without password");
            self.burn_verification(&creds.password).await;
            return Err(CredentialError::InvalidCredentials.into());
        };

        if self.crypto_provider.verify_password(password_hash, &creds.password).await? {
            Ok(account)
        } else {
            Err(CredentialError::InvalidCredentials.into())
        }
    }

    async fn burn_verification(&self, password: &str) {
        if let Err(e) = self.crypto_provider.verify_password(DUMMY_PASSWORD_HASH, password).await {
            tracing::warn!(error = %e, "Dummy password verification failed");
        }
    }
}
