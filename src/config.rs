use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::utils::constants::DEFAULT_DEEP_LINK_SCHEME;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid backend URL {url}: {message}")]
    InvalidBackendUrl { url: String, message: String },

    #[error("invalid deep link scheme: {0}")]
    InvalidScheme(String),

    #[error("could not build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url_development: String,
    pub backend_url_production: String,
    pub environment: String,
    pub enable_logging: bool,
    pub network_timeout_seconds: u32,
    pub deep_link_scheme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url_development: "http://localhost:4000".to_string(),
            backend_url_production: "https://api.treasurehunt.travel".to_string(),
            environment: "development".to_string(),
            enable_logging: true,
            network_timeout_seconds: 30,
            deep_link_scheme: DEFAULT_DEEP_LINK_SCHEME.to_string(),
        }
    }
}

impl AppConfig {
    /// Construye la configuración desde variables de entorno de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url_development: option_env!("BACKEND_URL_DEVELOPMENT")
                .map(str::to_string)
                .unwrap_or(defaults.backend_url_development),
            backend_url_production: option_env!("BACKEND_URL_PRODUCTION")
                .map(str::to_string)
                .unwrap_or(defaults.backend_url_production),
            environment: option_env!("ENVIRONMENT")
                .map(str::to_string)
                .unwrap_or(defaults.environment),
            enable_logging: option_env!("ENABLE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_logging),
            network_timeout_seconds: option_env!("NETWORK_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.network_timeout_seconds),
            deep_link_scheme: option_env!("DEEP_LINK_SCHEME")
                .map(str::to_string)
                .unwrap_or(defaults.deep_link_scheme),
        }
    }

    /// URL del backend según el entorno actual
    pub fn backend_url(&self) -> &str {
        match self.environment.as_str() {
            "production" => &self.backend_url_production,
            _ => &self.backend_url_development,
        }
    }

    /// Origen del backend ya parseado, base de todos los paths de la API
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.backend_url();
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBackendUrl {
            url: raw.to_string(),
            message: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBackendUrl {
                url: raw.to_string(),
                message: "URL cannot be used as a base".to_string(),
            });
        }
        Ok(url)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.network_timeout_seconds))
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.enable_logging
    }

    /// Esquema URI propio de los callbacks de pago y demás deep links
    pub fn deep_link_scheme(&self) -> Result<&str, ConfigError> {
        let scheme = self.deep_link_scheme.as_str();
        let valid = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            Ok(scheme)
        } else {
            Err(ConfigError::InvalidScheme(scheme.to_string()))
        }
    }
}

lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
