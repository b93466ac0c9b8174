//! # Shipping Client
//!
//! Quotes are in the shipping service's base currency; the orchestrator
//! converts them.

use crate::transport::HttpTransport;
use async_trait::async_trait;
use checkout_core::{Address, CartItem, Money, ServiceResult, ShippingService};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Serialize)]
struct ShipmentRequest<'a> {
    address: &'a Address,
    items: &'a [CartItem],
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    cost: Money,
}

#[derive(Debug, Deserialize)]
struct ShipOrderResponse {
    tracking_id: String,
}

/// Shipping quotes and dispatch over HTTP
pub struct HttpShippingClient {
    transport: HttpTransport,
}

impl HttpShippingClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ShippingService for HttpShippingClient {
    #[instrument(skip(self, address, items), fields(items = items.len()))]
    async fn get_quote(&self, address: &Address, items: &[CartItem]) -> ServiceResult<Money> {
        let quote: QuoteResponse = self
            .transport
            .post_json("/v1/quote", &ShipmentRequest { address, items })
            .await?;
        Ok(quote.cost)
    }

    #[instrument(skip(self, address, items), fields(items = items.len()))]
    async fn ship_order(&self, address: &Address, items: &[CartItem]) -> ServiceResult<String> {
        let shipped: ShipOrderResponse = self
            .transport
            .post_json("/v1/ship", &ShipmentRequest { address, items })
            .await?;
        Ok(shipped.tracking_id)
    }
}
