//! # Service Endpoints
//!
//! Where the downstream services live and how long a call may take.
//!
//! Values come from `config/services.toml` when present, then environment
//! variables override them one by one. Every address must end up set.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default per-call timeout in milliseconds
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 800;

const CONFIG_PATHS: [&str; 2] = ["config/services.toml", "../config/services.toml"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Base URLs of every downstream service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesConfig {
    pub cart_url: String,
    pub catalog_url: String,
    pub currency_url: String,
    pub shipping_url: String,
    pub payment_url: String,
    pub email_url: String,
    /// Bound on each individual call
    pub call_timeout: Duration,
}

/// Shape of `services.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
struct ServicesFile {
    cart_addr: Option<String>,
    catalog_addr: Option<String>,
    currency_addr: Option<String>,
    shipping_addr: Option<String>,
    payment_addr: Option<String>,
    email_addr: Option<String>,
    call_timeout_ms: Option<u64>,
}

impl ServicesConfig {
    /// Load from `config/services.toml` (if found) and environment variables.
    ///
    /// Env vars:
    /// - `CART_SERVICE_ADDR`
    /// - `PRODUCT_CATALOG_SERVICE_ADDR`
    /// - `CURRENCY_SERVICE_ADDR`
    /// - `SHIPPING_SERVICE_ADDR`
    /// - `PAYMENT_SERVICE_ADDR`
    /// - `EMAIL_SERVICE_ADDR`
    /// - `CHECKOUT_CALL_TIMEOUT_MS` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut file = ServicesFile::default();
        for path in CONFIG_PATHS {
            if let Ok(content) = std::fs::read_to_string(path) {
                file = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
                tracing::info!("Loaded service endpoints from {}", path);
                break;
            }
        }

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Parse a `services.toml` document, with no environment overrides
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let file: ServicesFile = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        Self::resolve(file, |_| None)
    }

    /// Every service at the same base URL (for testing)
    pub fn single_host(base_url: impl Into<String>) -> Self {
        let base = normalize_url(&base_url.into());
        Self {
            cart_url: base.clone(),
            catalog_url: base.clone(),
            currency_url: base.clone(),
            shipping_url: base.clone(),
            payment_url: base.clone(),
            email_url: base,
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
        }
    }

    /// Builder: set the per-call timeout
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    fn resolve(
        file: ServicesFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let pick = |key: &'static str, from_file: Option<String>| {
            env(key)
                .filter(|v| !v.is_empty())
                .or(from_file)
                .map(|v| normalize_url(&v))
                .ok_or(ConfigError::Missing(key))
        };

        let call_timeout_ms = match env("CHECKOUT_CALL_TIMEOUT_MS").filter(|v| !v.is_empty()) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "CHECKOUT_CALL_TIMEOUT_MS",
                value,
            })?,
            None => file.call_timeout_ms.unwrap_or(DEFAULT_CALL_TIMEOUT_MS),
        };
        if call_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "CHECKOUT_CALL_TIMEOUT_MS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            cart_url: pick("CART_SERVICE_ADDR", file.cart_addr)?,
            catalog_url: pick("PRODUCT_CATALOG_SERVICE_ADDR", file.catalog_addr)?,
            currency_url: pick("CURRENCY_SERVICE_ADDR", file.currency_addr)?,
            shipping_url: pick("SHIPPING_SERVICE_ADDR", file.shipping_addr)?,
            payment_url: pick("PAYMENT_SERVICE_ADDR", file.payment_addr)?,
            email_url: pick("EMAIL_SERVICE_ADDR", file.email_addr)?,
            call_timeout: Duration::from_millis(call_timeout_ms),
        })
    }
}

/// Accept bare `host:port` addresses and drop trailing slashes
fn normalize_url(addr: &str) -> String {
    let addr = addr.trim().trim_end_matches('/');
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const ALL_ADDRS: [(&str, &str); 6] = [
        ("CART_SERVICE_ADDR", "cartservice:7070"),
        ("PRODUCT_CATALOG_SERVICE_ADDR", "productcatalogservice:3550"),
        ("CURRENCY_SERVICE_ADDR", "currencyservice:7000"),
        ("SHIPPING_SERVICE_ADDR", "shippingservice:50051"),
        ("PAYMENT_SERVICE_ADDR", "https://payments.internal/"),
        ("EMAIL_SERVICE_ADDR", "emailservice:5000"),
    ];

    #[test]
    fn test_resolve_from_env() {
        let config = ServicesConfig::resolve(ServicesFile::default(), env_of(&ALL_ADDRS)).unwrap();

        assert_eq!(config.cart_url, "http://cartservice:7070");
        assert_eq!(config.payment_url, "https://payments.internal");
        assert_eq!(
            config.call_timeout,
            Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS)
        );
    }

    #[test]
    fn test_missing_address() {
        let err = ServicesConfig::resolve(ServicesFile::default(), env_of(&ALL_ADDRS[..5]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("EMAIL_SERVICE_ADDR")));
    }

    #[test]
    fn test_env_overrides_file() {
        let file: ServicesFile = toml::from_str(
            r#"
            cart_addr = "localhost:7070"
            catalog_addr = "localhost:3550"
            currency_addr = "localhost:7000"
            shipping_addr = "localhost:50051"
            payment_addr = "localhost:50052"
            email_addr = "localhost:5000"
            call_timeout_ms = 250
            "#,
        )
        .unwrap();

        let config =
            ServicesConfig::resolve(file, env_of(&[("CART_SERVICE_ADDR", "cart.prod:80")])).unwrap();

        assert_eq!(config.cart_url, "http://cart.prod:80");
        assert_eq!(config.email_url, "http://localhost:5000");
        assert_eq!(config.call_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_timeout() {
        let mut pairs = ALL_ADDRS.to_vec();
        pairs.push(("CHECKOUT_CALL_TIMEOUT_MS", "soon"));
        let err = ServicesConfig::resolve(ServicesFile::default(), env_of(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_from_toml_requires_every_address() {
        let err = ServicesConfig::from_toml(r#"cart_addr = "localhost:7070""#).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_single_host() {
        let config = ServicesConfig::single_host("http://127.0.0.1:9000/");
        assert_eq!(config.shipping_url, "http://127.0.0.1:9000");
        assert_eq!(config.email_url, config.cart_url);
    }
}
