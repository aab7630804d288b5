use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::config_spec::ConfigSpec;
use crate::config::errors::ApplicationError;

const DEFAULT_DATABASE_URL: &str = "sqlite://directory.db?mode=rwc";

/// Infrastructure settings read once at startup
pub struct BootstrapSettings {
    database_url: String,
    server_host: String,
    server_port: u16,
    public_domain: String,
    upload_dir: PathBuf,
    registration_requires_payment: bool,
    registration_fee: u64,
    payment_currency: String,
}

impl BootstrapSettings {
    /// Load bootstrap settings through the given environment provider
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ApplicationError> {
        let database_url = Self::resolve_database_url(env_provider.clone())?;

        let server_host = ConfigSpec::new(env_provider.clone())
            .env_override("HOST")
            .default_value("0.0.0.0")
            .validator(ConfigSpec::validate_host_address)
            .load()?;

        let port_value = ConfigSpec::new(env_provider.clone())
            .env_override("PORT")
            .default_value("3000")
            .validator(|value| ConfigSpec::validate_port_range(value, 1, 65535))
            .load()?;
        let server_port = ConfigSpec::parse_port(&port_value, "PORT")?;

        let public_domain = ConfigSpec::new(env_provider.clone())
            .env_override("PUBLIC_DOMAIN")
            .default_value("http://localhost:3000")
            .min_length(1)
            .load()?;

        let upload_dir = ConfigSpec::new(env_provider.clone())
            .env_override("UPLOAD_DIR")
            .default_value("public/uploads")
            .validator(ConfigSpec::validate_not_blank)
            .load()?;

        let requires_payment = ConfigSpec::new(env_provider.clone())
            .env_override("REGISTRATION_REQUIRES_PAYMENT")
            .default_value("false")
            .load()?;
        let registration_requires_payment =
            ConfigSpec::parse_bool(&requires_payment, "REGISTRATION_REQUIRES_PAYMENT")?;

        let fee = ConfigSpec::new(env_provider.clone())
            .env_override("REGISTRATION_FEE")
            .default_value("100")
            .load()?;
        let registration_fee = ConfigSpec::parse_positive_integer(&fee, "REGISTRATION_FEE")?;

        let payment_currency = ConfigSpec::new(env_provider)
            .env_override("PAYMENT_CURRENCY")
            .default_value("INR")
            .validator(ConfigSpec::validate_not_blank)
            .load()?;

        Ok(Self {
            database_url,
            server_host,
            server_port,
            public_domain: public_domain.trim_end_matches('/').to_string(),
            upload_dir: PathBuf::from(upload_dir),
            registration_requires_payment,
            registration_fee,
            payment_currency,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ApplicationError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    /// `DATABASE_URL` → `DB_HOST`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` as mysql → local sqlite file
    fn resolve_database_url(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<String, ApplicationError> {
        let explicit = ConfigSpec::new(env_provider.clone())
            .env_override("DATABASE_URL")
            .min_length(1)
            .load()?;
        if !explicit.is_empty() {
            return Ok(explicit);
        }

        let host = ConfigSpec::new(env_provider.clone()).env_override("DB_HOST").load()?;
        if host.is_empty() {
            return Ok(DEFAULT_DATABASE_URL.to_string());
        }

        let user = ConfigSpec::new(env_provider.clone())
            .env_override("DB_USER")
            .default_value("root")
            .load()?;
        let password = ConfigSpec::new(env_provider.clone()).env_override("DB_PASSWORD").load()?;
        let name = ConfigSpec::new(env_provider)
            .env_override("DB_NAME")
            .required(true)
            .min_length(1)
            .load()?;

        let credentials = if password.is_empty() {
            user
        } else {
            format!("{}:{}", user, password)
        };

        Ok(format!("mysql://{}@{}/{}", credentials, host, name))
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn public_domain(&self) -> &str {
        &self.public_domain
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn registration_requires_payment(&self) -> bool {
        self.registration_requires_payment
    }

    /// In major currency units
    pub fn registration_fee(&self) -> u64 {
        self.registration_fee
    }

    pub fn payment_currency(&self) -> &str {
        &self.payment_currency
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The mysql form embeds the password
        let database = self
            .database_url
            .split_once('@')
            .map(|(_, rest)| format!("<credentials>@{}", rest))
            .unwrap_or_else(|| self.database_url.clone());

        f.debug_struct("BootstrapSettings")
            .field("database_url", &database)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("public_domain", &self.public_domain)
            .field("upload_dir", &self.upload_dir)
            .field("registration_requires_payment", &self.registration_requires_payment)
            .field("registration_fee", &self.registration_fee)
            .field("payment_currency", &self.payment_currency)
            .finish()
    }
}
