//! # Request Handlers
//!
//! Axum request handlers for the checkout API.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use checkout_core::{CheckoutError, OrderResult, PlaceOrderRequest};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Place order response
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub order: OrderResult,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    /// Checkout stage that failed, when the failure came from checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<&'static str>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            stage: None,
        }
    }

    pub fn with_stage(mut self, stage: &'static str) -> Self {
        self.stage = Some(stage);
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn checkout_error_to_response(err: CheckoutError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code).with_stage(err.stage().as_str());
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Flags the in-flight checkout as cancelled if the request goes away first
struct CancelOnDrop(watch::Sender<bool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        let _ = self.0.send(true);
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Place an order for the user's current cart.
///
/// Checkout runs on its own task so a dropped connection cannot abort a
/// stage halfway; the orchestrator sees the cancellation between stages.
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let _guard = CancelOnDrop(cancel_tx);

    let checkout = state.checkout.clone();
    let task = tokio::spawn(async move {
        checkout
            .place_order_cancellable(&request, cancel_rx)
            .await
    });

    let order = match task.await {
        Ok(result) => result.map_err(|e| {
            error!("Checkout failed at {}: {}", e.stage(), e);
            checkout_error_to_response(e)
        })?,
        Err(e) => {
            error!("Checkout task aborted: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("checkout aborted", 500)),
            ));
        }
    };

    info!(
        "Placed order: order_id={}, tracking_id={}, total={}",
        order.order_id, order.shipping_tracking_id, order.total
    );

    Ok(Json(PlaceOrderResponse { order }))
}
