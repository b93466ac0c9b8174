//! # checkout-clients
//!
//! HTTP implementations of the services checkout talks to.
//!
//! Each client implements one of the `checkout-core` service traits over a
//! small JSON API:
//!
//! | Client               | Calls                                          |
//! |----------------------|------------------------------------------------|
//! | `HttpCartClient`     | `GET/DELETE /v1/carts/{user_id}`               |
//! | `HttpCatalogClient`  | `GET /v1/products/{id}`                        |
//! | `HttpCurrencyClient` | `POST /v1/convert`                             |
//! | `HttpShippingClient` | `POST /v1/quote`, `POST /v1/ship`              |
//! | `HttpPaymentClient`  | `POST /v1/charge`                              |
//! | `HttpEmailClient`    | `POST /v1/confirmations`                       |
//!
//! Errors come back as `{"error": "..."}`; the status picks the
//! [`ServiceError`](checkout_core::ServiceError) variant.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_clients::{http_services, ServicesConfig};
//! use checkout_core::CheckoutService;
//!
//! let config = ServicesConfig::from_env()?;
//! let checkout = CheckoutService::new(http_services(&config)?);
//! ```

pub mod cart;
pub mod catalog;
pub mod config;
pub mod currency;
pub mod email;
pub mod payment;
pub mod shipping;
pub mod transport;

use checkout_core::Services;
use std::sync::Arc;

// Re-exports
pub use cart::HttpCartClient;
pub use catalog::HttpCatalogClient;
pub use config::{ConfigError, ServicesConfig, DEFAULT_CALL_TIMEOUT_MS};
pub use currency::HttpCurrencyClient;
pub use email::HttpEmailClient;
pub use payment::HttpPaymentClient;
pub use shipping::HttpShippingClient;
pub use transport::{build_http_client, HttpTransport};

/// Wire every service trait to its HTTP client.
///
/// All clients share one connection pool.
pub fn http_services(config: &ServicesConfig) -> Result<Services, ConfigError> {
    let client = build_http_client(config.call_timeout)?;
    let transport = |base_url: &str, service: &'static str| {
        HttpTransport::new(client.clone(), base_url, service, config.call_timeout)
    };

    Ok(Services {
        cart: Arc::new(HttpCartClient::new(transport(&config.cart_url, "cart"))),
        catalog: Arc::new(HttpCatalogClient::new(transport(
            &config.catalog_url,
            "catalog",
        ))),
        currency: Arc::new(HttpCurrencyClient::new(transport(
            &config.currency_url,
            "currency",
        ))),
        shipping: Arc::new(HttpShippingClient::new(transport(
            &config.shipping_url,
            "shipping",
        ))),
        payment: Arc::new(HttpPaymentClient::new(transport(
            &config.payment_url,
            "payment",
        ))),
        email: Arc::new(HttpEmailClient::new(transport(&config.email_url, "email"))),
    })
}
