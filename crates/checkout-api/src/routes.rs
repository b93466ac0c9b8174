//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  / - Health check
/// - POST /api/v1/orders - Place an order
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new().route("/orders", post(handlers::place_order));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppConfig, LogFormat};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use checkout_core::fakes::FakeServices;
    use checkout_core::{CartItem, CheckoutService, Money};
    use serde_json::{json, Value};

    fn test_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_format: LogFormat::Pretty,
        }
    }

    fn server_for(fakes: &FakeServices) -> TestServer {
        let state = AppState::with_checkout(CheckoutService::new(fakes.services()), test_config());
        TestServer::new(create_router(state)).unwrap()
    }

    fn stocked() -> FakeServices {
        FakeServices::new()
            .with_cart_items(vec![CartItem::new("P1", 2)])
            .with_price("P1", Money::from_units("USD", 10))
            .with_quote(Money::from_units("USD", 5))
    }

    fn order_body() -> Value {
        json!({
            "user_id": "u1",
            "user_currency": "USD",
            "address": {
                "street_address": "1600 Amphitheatre Parkway",
                "city": "Mountain View",
                "state": "CA",
                "country": "US",
                "zip_code": 94043
            },
            "email": "someone@example.com",
            "credit_card": {
                "number": "4432801561520454",
                "cvv": 672,
                "expiration_year": 2030,
                "expiration_month": 1
            }
        })
    }

    #[tokio::test]
    async fn test_health() {
        let server = server_for(&FakeServices::new());

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");

        server.get("/").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_place_order() {
        let fakes = stocked();
        let server = server_for(&fakes);

        let response = server.post("/api/v1/orders").json(&order_body()).await;
        response.assert_status_ok();

        let body: Value = response.json();
        let order = &body["order"];
        assert_eq!(order["total"], json!({"currency_code": "USD", "units": 25, "nanos": 0}));
        assert_eq!(order["items"][0]["item"]["quantity"], 2);
        assert!(order["order_id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(fakes.was_called("email.send_order_confirmation"));
    }

    #[tokio::test]
    async fn test_declined_charge() {
        let fakes = stocked().decline_charge();
        let server = server_for(&fakes);

        let response = server.post("/api/v1/orders").json(&order_body()).await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: Value = response.json();
        assert_eq!(body["code"], 402);
        assert_eq!(body["stage"], "charging");
        assert!(!fakes.was_called("shipping.ship_order"));
    }

    #[tokio::test]
    async fn test_shipment_failure() {
        let fakes = stocked().fail_ship();
        let server = server_for(&fakes);

        let response = server.post("/api/v1/orders").json(&order_body()).await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = response.json();
        assert_eq!(body["stage"], "shipping");
        assert_eq!(fakes.charges().len(), 1);
    }

    #[tokio::test]
    async fn test_preparation_failure() {
        let fakes = stocked().fail_get_cart();
        let server = server_for(&fakes);

        let response = server.post("/api/v1/orders").json(&order_body()).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = response.json();
        assert_eq!(body["stage"], "preparing");
        assert!(fakes.charges().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let fakes = stocked();
        let server = server_for(&fakes);

        let response = server
            .post("/api/v1/orders")
            .json(&json!({"user_id": "u1"}))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(fakes.calls().is_empty());
    }
}
