//! # Product Catalog Client

use crate::transport::HttpTransport;
use async_trait::async_trait;
use checkout_core::{CatalogService, Money, ServiceResult};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct ProductResponse {
    price: Money,
}

/// Product catalog over HTTP
pub struct HttpCatalogClient {
    transport: HttpTransport,
}

impl HttpCatalogClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    #[instrument(skip(self))]
    async fn get_product_price(&self, product_id: &str) -> ServiceResult<Money> {
        let product: ProductResponse = self.transport.get_json("/v1/products", product_id).await?;
        Ok(product.price)
    }
}
