//! # Application State
//!
//! Shared state for the Axum application: the orchestrator and its settings.

use anyhow::Context;
use checkout_clients::{http_services, ServicesConfig};
use checkout_core::{CheckoutConfig, CheckoutService};
use std::net::SocketAddr;
use std::sync::Arc;

/// Default listen port
pub const DEFAULT_PORT: u16 = 5050;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables (`HOST`, `PORT`, `ENVIRONMENT`, `LOG_FORMAT`)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: env("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            environment: env("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_format: env("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub config: AppConfig,
}

impl AppState {
    /// Build state from the environment, wiring HTTP clients for every service
    pub fn new() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env())
    }

    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let services_config =
            ServicesConfig::from_env().context("failed to load service endpoints")?;
        let services =
            http_services(&services_config).context("failed to build service clients")?;

        tracing::info!(
            "Service endpoints: cart={}, catalog={}, currency={}, shipping={}, payment={}, email={}",
            services_config.cart_url,
            services_config.catalog_url,
            services_config.currency_url,
            services_config.shipping_url,
            services_config.payment_url,
            services_config.email_url
        );

        let checkout = CheckoutService::new(services).with_config(CheckoutConfig {
            call_timeout: services_config.call_timeout,
        });

        Ok(Self::with_checkout(checkout, config))
    }

    /// State around an already-built orchestrator
    pub fn with_checkout(checkout: CheckoutService, config: AppConfig) -> Self {
        Self {
            checkout: Arc::new(checkout),
            config,
        }
    }
}
