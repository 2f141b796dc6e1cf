//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` URL for the session store;
//!   sessions stay in memory when unset
//! - `STOREFRONT_STRICT_VALIDATION` - Format-check checkout fields (default: false)
//! - `STOREFRONT_ORDER_DELAY_MS` - Simulated order processing time (default: 3000)
//! - `STOREFRONT_LOGIN_DELAY_MS` - Simulated sign-in round trip (default: 1500)
//! - `STOREFRONT_SOCIAL_LOGIN_DELAY_MS` - Simulated social sign-in (default: 2000)
//! - `STOREFRONT_NEWSLETTER_DELAY_MS` - Simulated newsletter signup (default: 1500)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ecommerce_hub_core::checkout::ValidationPolicy;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Simulated latencies for the mocked back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedDelays {
    pub order: Duration,
    pub login: Duration,
    pub social_login: Duration,
    pub newsletter: Duration,
}

impl SimulatedDelays {
    /// No waiting at all; used by tests.
    pub const NONE: Self = Self {
        order: Duration::ZERO,
        login: Duration::ZERO,
        social_login: Duration::ZERO,
        newsletter: Duration::ZERO,
    };
}

impl Default for SimulatedDelays {
    fn default() -> Self {
        Self {
            order: Duration::from_millis(3000),
            login: Duration::from_millis(1500),
            social_login: Duration::from_millis(2000),
            newsletter: Duration::from_millis(1500),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session store database (contains password)
    pub database_url: Option<SecretString>,
    /// Checkout validation policy
    pub validation: ValidationPolicy,
    /// Simulated back-end latencies
    pub delays: SimulatedDelays,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            database_url: None,
            validation: ValidationPolicy::PresenceOnly,
            delays: SimulatedDelays::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let default_delays = defaults.delays;

        let host = parse_or("STOREFRONT_HOST", &lookup, defaults.host)?;
        let port = parse_or("STOREFRONT_PORT", &lookup, defaults.port)?;
        let base_url = lookup("STOREFRONT_BASE_URL").unwrap_or(defaults.base_url);
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let database_url = lookup("STOREFRONT_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .map(SecretString::from);

        let strict = parse_bool("STOREFRONT_STRICT_VALIDATION", &lookup, false)?;
        let validation = if strict {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::PresenceOnly
        };

        let delays = SimulatedDelays {
            order: parse_millis("STOREFRONT_ORDER_DELAY_MS", &lookup, default_delays.order)?,
            login: parse_millis("STOREFRONT_LOGIN_DELAY_MS", &lookup, default_delays.login)?,
            social_login: parse_millis(
                "STOREFRONT_SOCIAL_LOGIN_DELAY_MS",
                &lookup,
                default_delays.social_login,
            )?,
            newsletter: parse_millis(
                "STOREFRONT_NEWSLETTER_DELAY_MS",
                &lookup,
                default_delays.newsletter,
            )?,
        };

        let sentry_sample_rate =
            parse_rate("SENTRY_SAMPLE_RATE", &lookup, defaults.sentry_sample_rate)?;
        let sentry_traces_sample_rate = parse_rate(
            "SENTRY_TRACES_SAMPLE_RATE",
            &lookup,
            defaults.sentry_traces_sample_rate,
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            database_url,
            validation,
            delays,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_or<T>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn parse_bool(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn parse_millis(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_rate(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: f32,
) -> Result<f32, ConfigError> {
    let rate: f32 = parse_or(key, lookup, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.validation, ValidationPolicy::PresenceOnly);
        assert_eq!(config.delays.order, Duration::from_secs(3));
        assert_eq!(config.delays.login, Duration::from_millis(1500));
        assert!(config.database_url.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_STRICT_VALIDATION", "true"),
            ("STOREFRONT_ORDER_DELAY_MS", "0"),
            ("STOREFRONT_DATABASE_URL", "postgres://localhost/sessions"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.is_secure());
        assert_eq!(config.validation, ValidationPolicy::Strict);
        assert_eq!(config.delays.order, Duration::ZERO);
        assert!(config.database_url.is_some());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("STOREFRONT_PORT", "not-a-port")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_PORT"
        ));
        assert!(load(&[("STOREFRONT_STRICT_VALIDATION", "maybe")]).is_err());
        assert!(load(&[("STOREFRONT_LOGIN_DELAY_MS", "-5")]).is_err());
        assert!(load(&[("SENTRY_SAMPLE_RATE", "1.5")]).is_err());
        assert!(load(&[("STOREFRONT_BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = load(&[("STOREFRONT_HOST", "0.0.0.0")]).unwrap();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 3000);
    }
}
