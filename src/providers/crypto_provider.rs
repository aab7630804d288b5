use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;

type HmacSha256 = Hmac<Sha256>;

/// Cryptographic operations provider
///
/// Password hashing is argon2id with a random per-hash salt and the server
/// pepper as the argon2 secret. Hashing runs on the blocking pool.
pub struct CryptoProvider {
    password_pepper: String,
}

impl CryptoProvider {
    pub fn new(password_pepper: impl Into<String>) -> Self {
        Self {
            password_pepper: password_pepper.into(),
        }
    }

    fn argon2(pepper: &[u8]) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(pepper, Algorithm::Argon2id, Version::V0x13, Params::default())
            .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Hash a plaintext password into a PHC string
    pub async fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let pepper = self.password_pepper.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || -> Result<String, InternalError> {
            let salt = SaltString::generate(&mut OsRng);
            let hash = Self::argon2(pepper.as_bytes())?
                .hash_password(password.as_bytes(), &salt)
                .map_err(|e| CredentialError::PasswordHashingFailed(e.to_string()))?;
            Ok(hash.to_string())
        })
        .await
        .map_err(|e| InternalError::crypto("hash_password", e.to_string()))?
    }

    /// Check a plaintext password against a stored hash
    ///
    /// A malformed stored hash verifies as `false`.
    pub async fn verify_password(&self, password_hash: &str, password: &str) -> Result<bool, InternalError> {
        let pepper = self.password_pepper.clone();
        let password_hash = password_hash.to_string();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || -> Result<bool, InternalError> {
            let parsed = match PasswordHash::new(&password_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored password hash is malformed");
                    return Ok(false);
                }
            };
            Ok(Self::argon2(pepper.as_bytes())?
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .map_err(|e| InternalError::crypto("verify_password", e.to_string()))?
    }

    /// HMAC-SHA256 of `message` under `key`, lower-case hex
    pub fn hmac_sha256_hex(&self, key: &str, message: &str) -> Result<String, InternalError> {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| InternalError::crypto("hmac_init", e.to_string()))?;
        mac.update(message.as_bytes());
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }

    /// Compare two strings without short-circuiting on the first mismatch
    pub fn constant_time_eq(&self, a: &str, b: &str) -> bool {
        if a.len() != b.len() {
            return false;
        }
        a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }

    /// 20 characters drawn from letters, digits and symbols
    pub fn generate_secure_password(&self) -> String {
        const PASSWORD_LENGTH: usize = 20;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                 abcdefghijklmnopqrstuvwxyz\
                                 0123456789\
                                 !@#$%^&*()_+-=[]{}|;:,.<>?";

        let mut rng = rand::rng();
        (0..PASSWORD_LENGTH)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}

impl std::fmt::Debug for CryptoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}
