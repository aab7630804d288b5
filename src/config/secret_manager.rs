use std::fmt;
use std::sync::Arc;

use crate::config::{EnvironmentProvider, SecretConfig, SystemEnvironment};

/// Custom error type for secret-related failures
#[derive(Debug)]
pub enum SecretError {
    Missing { secret_name: String },
    InvalidLength { secret_name: String, expected: usize, actual: usize },
    IncompletePair { present: String, missing: String },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn invalid_length(secret_name: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            secret_name: secret_name.to_string(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::InvalidLength { secret_name, expected, actual } => {
                write!(
                    f,
                    "Secret '{}' must be at least {} characters, got {}",
                    secret_name, expected, actual
                )
            }
            Self::IncompletePair { present, missing } => {
                write!(f, "Secret '{}' is set but '{}' is missing", present, missing)
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Razorpay API key pair
#[derive(Clone)]
pub struct PaymentKeys {
    pub key_id: String,
    pub key_secret: String,
}

impl fmt::Debug for PaymentKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentKeys")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

/// Centralized manager for application secrets
pub struct SecretManager {
    session_secret: String,
    password_pepper: String,
    payment_keys: Option<PaymentKeys>,
}

impl SecretManager {
    /// Load and validate all secrets from the process environment
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or fails validation
    pub fn init() -> Result<Self, SecretError> {
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, SecretError> {
        let env = env_provider.as_ref();
        let session_secret = Self::load_secret(env, &Self::session_config())?;
        let password_pepper = Self::load_secret(env, &Self::pepper_config())?;

        let key_id = Self::load_secret(env, &SecretConfig::env("RAZORPAY_KEY_ID").required(false))?;
        let key_secret = Self::load_secret(env, &SecretConfig::env("RAZORPAY_KEY_SECRET").required(false))?;

        let payment_keys = match (key_id.is_empty(), key_secret.is_empty()) {
            (true, true) => None,
            (false, false) => Some(PaymentKeys { key_id, key_secret }),
            (false, true) => {
                return Err(SecretError::IncompletePair {
                    present: "RAZORPAY_KEY_ID".to_string(),
                    missing: "RAZORPAY_KEY_SECRET".to_string(),
                });
            }
            (true, false) => {
                return Err(SecretError::IncompletePair {
                    present: "RAZORPAY_KEY_SECRET".to_string(),
                    missing: "RAZORPAY_KEY_ID".to_string(),
                });
            }
        };

        Ok(Self {
            session_secret,
            password_pepper,
            payment_keys,
        })
    }

    /// HS256 signing key for access tokens
    fn session_config() -> SecretConfig {
        SecretConfig::env("SESSION_SECRET").required(true).min_length(32)
    }

    /// Argon2 secret
    fn pepper_config() -> SecretConfig {
        SecretConfig::env("PASSWORD_PEPPER").required(true).min_length(16)
    }

    pub fn session_secret(&self) -> &str {
        &self.session_secret
    }

    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    /// None when payments are not configured
    pub fn payment_keys(&self) -> Option<&PaymentKeys> {
        self.payment_keys.as_ref()
    }

    pub(crate) fn load_secret(
        env: &(dyn EnvironmentProvider + Send + Sync),
        config: &SecretConfig,
    ) -> Result<String, SecretError> {
        let name = config.secret_type.name();
        let value = match env.get_var(name) {
            Some(v) => v,
            None if !config.required => return Ok(String::new()),
            None => return Err(SecretError::missing(name)),
        };

        if let Some(min_len) = config.min_length {
            if value.len() < min_len {
                return Err(SecretError::invalid_length(name, min_len, value.len()));
            }
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("session_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("payment_keys", &self.payment_keys)
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SecretManager {{ secrets_loaded: {} }}",
            if self.payment_keys.is_some() { 4 } else { 2 }
        )
    }
}
