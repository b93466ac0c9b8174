//! # Payment Client
//!
//! Charges are never retried here; a repeated charge could bill the card twice.

use crate::transport::HttpTransport;
use async_trait::async_trait;
use checkout_core::{CreditCard, Money, PaymentService, ServiceResult};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Serialize)]
struct ChargeRequest<'a> {
    amount: &'a Money,
    credit_card: &'a CreditCard,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    transaction_id: String,
}

/// Card payments over HTTP
pub struct HttpPaymentClient {
    transport: HttpTransport,
}

impl HttpPaymentClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl PaymentService for HttpPaymentClient {
    #[instrument(skip(self, amount, card), fields(amount = %amount, card = %card.masked_number()))]
    async fn charge(&self, amount: &Money, card: &CreditCard) -> ServiceResult<String> {
        let response: ChargeResponse = self
            .transport
            .post_json(
                "/v1/charge",
                &ChargeRequest {
                    amount,
                    credit_card: card,
                },
            )
            .await?;

        info!("charge accepted: transaction_id={}", response.transaction_id);
        Ok(response.transaction_id)
    }
}
