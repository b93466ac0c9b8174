//! # Email Client

use crate::transport::HttpTransport;
use async_trait::async_trait;
use checkout_core::{EmailService, OrderResult, ServiceResult};
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
struct ConfirmationRequest<'a> {
    email: &'a str,
    order: &'a OrderResult,
}

/// Order confirmation email over HTTP
pub struct HttpEmailClient {
    transport: HttpTransport,
}

impl HttpEmailClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl EmailService for HttpEmailClient {
    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> ServiceResult<()> {
        self.transport
            .post_unit("/v1/confirmations", &ConfirmationRequest { email, order })
            .await
    }
}
