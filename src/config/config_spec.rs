use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::errors::ApplicationError;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValueSource {
    EnvironmentVariable { name: String },
    Default,
    Unset,
}

#[derive(Debug, Clone)]
pub struct ConfigValue {
    pub value: String,
    pub source: ConfigValueSource,
}

/// Rule for one setting: environment override → default, then validation
pub struct ConfigSpec {
    env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    pub env_override: Option<String>,
    pub default_value: Option<String>,
    pub required: bool,
    pub min_length: Option<usize>,
    pub validator: Option<fn(&str) -> Result<(), String>>,
}

impl ConfigSpec {
    pub fn new(env_provider: Arc<dyn EnvironmentProvider + Send + Sync>) -> Self {
        Self {
            env_provider,
            env_override: None,
            default_value: None,
            required: false,
            min_length: None,
            validator: None,
        }
    }

    pub fn env_override(mut self, name: &str) -> Self {
        self.env_override = Some(name.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn validator(mut self, f: fn(&str) -> Result<(), String>) -> Self {
        self.validator = Some(f);
        self
    }

    fn setting_name(&self) -> &str {
        self.env_override.as_deref().unwrap_or("unknown_setting")
    }

    /// Load the value with the source it came from
    ///
    /// # Errors
    /// * `ApplicationError::InvalidSetting` - value fails validation, or a required setting is unset
    pub fn load_setting_with_source(&self) -> Result<ConfigValue, ApplicationError> {
        if let Some(env_var) = &self.env_override {
            if let Some(value) = self.env_provider.get_var(env_var) {
                self.validate_value(&value, env_var)?;
                return Ok(ConfigValue {
                    value,
                    source: ConfigValueSource::EnvironmentVariable { name: env_var.clone() },
                });
            }
        }

        if let Some(default) = &self.default_value {
            self.validate_value(default, self.setting_name())?;
            return Ok(ConfigValue {
                value: default.clone(),
                source: ConfigValueSource::Default,
            });
        }

        if self.required {
            return Err(ApplicationError::invalid_setting(
                self.setting_name(),
                "Required setting has no value from any source",
            ));
        }

        Ok(ConfigValue {
            value: String::new(),
            source: ConfigValueSource::Unset,
        })
    }

    /// Load only the value
    pub fn load(&self) -> Result<String, ApplicationError> {
        Ok(self.load_setting_with_source()?.value)
    }

    pub fn validate_value(&self, value: &str, setting_name: &str) -> Result<(), ApplicationError> {
        if let Some(min_len) = self.min_length {
            if value.len() < min_len {
                return Err(ApplicationError::invalid_setting(
                    setting_name,
                    format!("Value must be at least {} characters long", min_len),
                ));
            }
        }

        if let Some(validator) = self.validator {
            validator(value).map_err(|reason| ApplicationError::invalid_setting(setting_name, reason))?;
        }

        Ok(())
    }
}

/// Parsing helpers for loaded values
impl ConfigSpec {
    /// true: "true", "1", "yes", "on"; false: "false", "0", "no", "off" (case insensitive)
    pub fn parse_bool(value: &str, setting_name: &str) -> Result<bool, ApplicationError> {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ApplicationError::parse_error(
                setting_name,
                format!("Expected boolean value, got '{}'", value),
            )),
        }
    }

    pub fn parse_positive_integer(value: &str, setting_name: &str) -> Result<u64, ApplicationError> {
        let parsed = value.trim().parse::<u64>().map_err(|e| {
            ApplicationError::parse_error(
                setting_name,
                format!("Expected positive integer, got '{}': {}", value, e),
            )
        })?;

        if parsed == 0 {
            return Err(ApplicationError::invalid_setting(setting_name, "Value must be greater than zero"));
        }

        Ok(parsed)
    }

    pub fn parse_port(value: &str, setting_name: &str) -> Result<u16, ApplicationError> {
        let port = value.trim().parse::<u16>().map_err(|e| {
            ApplicationError::parse_error(
                setting_name,
                format!("Expected port number (1-65535), got '{}': {}", value, e),
            )
        })?;

        if port == 0 {
            return Err(ApplicationError::invalid_setting(
                setting_name,
                "Port number must be between 1 and 65535",
            ));
        }

        Ok(port)
    }

    pub fn validate_port_range(value: &str, min: u16, max: u16) -> Result<(), String> {
        let parsed = value
            .parse::<u16>()
            .map_err(|_| format!("Expected port number between {} and {}", min, max))?;

        if parsed < min || parsed > max {
            return Err(format!("Port {} is outside valid range {}-{}", parsed, min, max));
        }

        Ok(())
    }

    pub fn validate_host_address(value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err("Host address cannot be empty".to_string());
        }
        if value.chars().any(char::is_whitespace) {
            return Err("Host address cannot contain whitespace characters".to_string());
        }
        Ok(())
    }

    pub fn validate_not_blank(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Value cannot be blank".to_string());
        }
        Ok(())
    }
}
