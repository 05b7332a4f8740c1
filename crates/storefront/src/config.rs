//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOUQ_BASE_URL` - Base URL of the store API (e.g. `https://api.souq.example/`)
//!
//! ## Optional
//! - `SOUQ_DATA_DIR` - Directory for the persisted cart, favorites and orders (default: `.souq`)
//! - `SOUQ_ENV` - `development` or `production` (default: `production`)
//! - `SOUQ_DELIVERY_FEE` - Flat delivery fee added at checkout (default: 5000)
//! - `SOUQ_REQUEST_TIMEOUT_SECS` - HTTP timeout for store API calls (default: 15)
//! - `GOOGLE_MAPS_API_KEY` - Enables reverse geocoding of delivery locations
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (defaults to `SOUQ_ENV`)

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use souq_core::Price;
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".souq";
const DEFAULT_DELIVERY_FEE: &str = "5000";
const DEFAULT_TIMEOUT_SECS: &str = "15";


/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
///
/// Development builds surface the store's own denial messages to the user;
/// production shows a generic message instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Whether this is a development environment.
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    /// Lowercase name, as used for `SOUQ_ENV` and the Sentry environment tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("expected development or production, got '{other}'")),
        }
    }
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the store API, always ending in `/`
    pub base_url: Url,
    /// Directory for durable client storage
    pub data_dir: PathBuf,
    /// Deployment environment
    pub environment: Environment,
    /// Flat delivery fee added to every order
    pub delivery_fee: Price,
    /// Timeout for store API requests
    pub request_timeout: Duration,
    /// Reverse geocoding, if configured
    pub geocoding: Option<GeocodingConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Google Maps geocoding configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeocodingConfig {
    /// Google Maps API key
    pub api_key: SecretString,
    /// Upper bound for one lookup.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for GeocodingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingConfig")
            .field("api_key", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from a map of variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_source(&|key| vars.get(key).cloned())
    }

    fn from_source(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = EnvSource(lookup);

        let base_url = parse_base_url("SOUQ_BASE_URL", &env.required("SOUQ_BASE_URL")?)?;
        let data_dir = PathBuf::from(env.or_default("SOUQ_DATA_DIR", DEFAULT_DATA_DIR));
        let environment = env
            .or_default("SOUQ_ENV", Environment::Production.as_str())
            .parse::<Environment>()
            .map_err(|e| ConfigError::InvalidEnvVar("SOUQ_ENV".to_string(), e))?;
        let delivery_fee = parse_price(
            "SOUQ_DELIVERY_FEE",
            &env.or_default("SOUQ_DELIVERY_FEE", DEFAULT_DELIVERY_FEE),
        )?;
        let request_timeout = env
            .or_default("SOUQ_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOUQ_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })
            .map(Duration::from_secs)?;

        let geocoding = env
            .optional("GOOGLE_MAPS_API_KEY")
            .map(|key| GeocodingConfig {
                api_key: SecretString::from(key),
                request_timeout,
            });

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env
            .optional("SENTRY_ENVIRONMENT")
            .or_else(|| Some(environment.as_str().to_string()));

        Ok(Self {
            base_url,
            data_dir,
            environment,
            delivery_fee,
            request_timeout,
            geocoding,
            sentry_dsn,
            sentry_environment,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct EnvSource<'a>(&'a dyn Fn(&str) -> Option<String>);

impl EnvSource<'_> {
    /// Get a required variable. Blank values count as missing.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse the API base URL, making sure relative joins append to its path.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_price(key: &str, value: &str) -> Result<Price, ConfigError> {
    let amount = value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Price::new(amount).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
