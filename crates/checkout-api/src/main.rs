//! # checkout
//!
//! Order checkout service.
//!
//! ## Usage
//!
//! ```bash
//! # Downstream services (or config/services.toml)
//! export CART_SERVICE_ADDR=cartservice:7070
//! export PRODUCT_CATALOG_SERVICE_ADDR=productcatalogservice:3550
//! export CURRENCY_SERVICE_ADDR=currencyservice:7000
//! export SHIPPING_SERVICE_ADDR=shippingservice:50051
//! export PAYMENT_SERVICE_ADDR=paymentservice:50051
//! export EMAIL_SERVICE_ADDR=emailservice:5000
//!
//! # Run the server
//! LOG_FORMAT=json checkout
//! ```

use checkout_api::{routes, AppConfig, AppState, LogFormat};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(config.log_format);

    print_banner();

    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Per-call timeout: {}ms",
        state.checkout.config().call_timeout.as_millis()
    );

    let app = routes::create_router(state);

    info!("checkout service starting on http://{}", addr);

    if !is_prod {
        info!("Health: GET http://{}/health", addr);
        info!("Place order: POST http://{}/api/v1/orders", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with((!json).then(fmt::layer))
        .with(json.then(|| fmt::layer().json()))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

fn print_banner() {
    println!(
        r#"
  checkout
  ━━━━━━━━━━━━━━━━━━━━━━━
  Order checkout orchestrator
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
