//! # Downstream Service Traits
//!
//! Capability traits for the services checkout depends on. Each transport
//! (HTTP, in-memory fakes) implements these, and checkout only ever talks to
//! `Arc<dyn ...>` handles bundled in [`Services`].
//!
//! ```text
//!                 ┌──────────────────┐
//!                 │ CheckoutService  │
//!                 └────────┬─────────┘
//!    ┌──────────┬──────────┼──────────┬──────────┬──────────┐
//!    ▼          ▼          ▼          ▼          ▼          ▼
//!  Cart     Catalog    Currency   Shipping   Payment     Email
//! ```

use crate::error::{ServiceError, ServiceResult};
use crate::money::Money;
use crate::order::{Address, CartItem, CreditCard, OrderResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// User carts
#[async_trait]
pub trait CartService: Send + Sync {
    /// Items currently in the user's cart, in cart order
    async fn get_cart(&self, user_id: &str) -> ServiceResult<Vec<CartItem>>;

    /// Remove every item from the user's cart
    async fn empty_cart(&self, user_id: &str) -> ServiceResult<()>;
}

/// Product catalog
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Unit price of a product in the catalog's base currency
    async fn get_product_price(&self, product_id: &str) -> ServiceResult<Money>;
}

/// Currency conversion
#[async_trait]
pub trait CurrencyService: Send + Sync {
    async fn convert(&self, from: &Money, to_code: &str) -> ServiceResult<Money>;
}

/// Shipping quotes and dispatch
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Cost to ship `items` to `address`, in the base currency
    async fn get_quote(&self, address: &Address, items: &[CartItem]) -> ServiceResult<Money>;

    /// Dispatch the shipment and return its tracking ID
    async fn ship_order(&self, address: &Address, items: &[CartItem]) -> ServiceResult<String>;
}

/// Card payments
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charge `amount` to the card and return the transaction ID
    async fn charge(&self, amount: &Money, card: &CreditCard) -> ServiceResult<String>;
}

/// Order confirmation email
#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_order_confirmation(&self, email: &str, order: &OrderResult)
        -> ServiceResult<()>;
}

/// Handles to every downstream service
#[derive(Clone)]
pub struct Services {
    pub cart: Arc<dyn CartService>,
    pub catalog: Arc<dyn CatalogService>,
    pub currency: Arc<dyn CurrencyService>,
    pub shipping: Arc<dyn ShippingService>,
    pub payment: Arc<dyn PaymentService>,
    pub email: Arc<dyn EmailService>,
}

/// Run one downstream call under the per-call timeout.
///
/// An elapsed timeout is reported as [`ServiceError::Timeout`], the same as any
/// other failure of that call.
pub async fn call_with_timeout<T, F>(timeout: Duration, call: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_call_with_timeout_elapses() {
        let result: ServiceResult<()> = call_with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert_eq!(result, Err(ServiceError::Timeout { after_ms: 50 }));
    }

    #[tokio::test]
    async fn test_call_with_timeout_passes_through() {
        let result = call_with_timeout(Duration::from_millis(50), async {
            Err::<(), _>(ServiceError::Unavailable("down".into()))
        })
        .await;

        assert_eq!(result, Err(ServiceError::Unavailable("down".into())));
    }
}
