//! # Cart Client

use crate::transport::HttpTransport;
use async_trait::async_trait;
use checkout_core::{CartItem, CartService, ServiceResult};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct CartResponse {
    #[serde(default)]
    items: Vec<CartItem>,
}

/// Cart service over HTTP
pub struct HttpCartClient {
    transport: HttpTransport,
}

impl HttpCartClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CartService for HttpCartClient {
    #[instrument(skip(self))]
    async fn get_cart(&self, user_id: &str) -> ServiceResult<Vec<CartItem>> {
        let cart: CartResponse = self.transport.get_json("/v1/carts", user_id).await?;
        Ok(cart.items)
    }

    #[instrument(skip(self))]
    async fn empty_cart(&self, user_id: &str) -> ServiceResult<()> {
        self.transport.delete("/v1/carts", user_id).await
    }
}
