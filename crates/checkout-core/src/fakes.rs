//! # In-memory Services
//!
//! Scriptable implementations of every downstream service trait for tests.
//! Each call is appended to a shared log (`"payment.charge"`, `"email.send_order_confirmation"`,
//! ...) so tests can assert which services ran and in what order.

use crate::error::{ServiceError, ServiceResult};
use crate::ids;
use crate::money::Money;
use crate::order::{Address, CartItem, CreditCard, OrderResult};
use crate::services::{
    CartService, CatalogService, CurrencyService, EmailService, PaymentService, Services,
    ShippingService,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builder and inspector for a set of in-memory services
#[derive(Clone, Default)]
pub struct FakeServices {
    cart_items: Vec<CartItem>,
    prices: HashMap<String, Money>,
    rates: HashMap<String, u32>,
    quote: Option<Money>,
    fail_get_cart: bool,
    fail_empty_cart: bool,
    fail_quote: bool,
    fail_ship: bool,
    decline_charge: bool,
    fail_email: bool,
    payment_delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
    charges: Arc<Mutex<Vec<Money>>>,
    emails: Arc<Mutex<Vec<(String, OrderResult)>>>,
}

impl FakeServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cart_items(mut self, items: Vec<CartItem>) -> Self {
        self.cart_items = items;
        self
    }

    pub fn with_price(mut self, product_id: impl Into<String>, price: Money) -> Self {
        self.prices.insert(product_id.into(), price);
        self
    }

    /// Whole-number conversion rate from any currency into `code`
    pub fn with_rate(mut self, code: impl Into<String>, rate: u32) -> Self {
        self.rates.insert(code.into(), rate);
        self
    }

    pub fn with_quote(mut self, quote: Money) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn fail_get_cart(mut self) -> Self {
        self.fail_get_cart = true;
        self
    }

    pub fn fail_empty_cart(mut self) -> Self {
        self.fail_empty_cart = true;
        self
    }

    pub fn fail_quote(mut self) -> Self {
        self.fail_quote = true;
        self
    }

    pub fn fail_ship(mut self) -> Self {
        self.fail_ship = true;
        self
    }

    pub fn decline_charge(mut self) -> Self {
        self.decline_charge = true;
        self
    }

    pub fn fail_email(mut self) -> Self {
        self.fail_email = true;
        self
    }

    /// Make every charge take this long before answering
    pub fn slow_payment(mut self, delay: Duration) -> Self {
        self.payment_delay = Some(delay);
        self
    }

    /// Service handles backed by this configuration
    pub fn services(&self) -> Services {
        let backend = Arc::new(FakeBackend {
            config: self.clone(),
        });
        Services {
            cart: backend.clone(),
            catalog: backend.clone(),
            currency: backend.clone(),
            shipping: backend.clone(),
            payment: backend.clone(),
            email: backend,
        }
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Returns true if `name` appears in the call log
    pub fn was_called(&self, name: &str) -> bool {
        lock(&self.calls).iter().any(|c| c == name)
    }

    /// Amounts passed to `payment.charge`
    pub fn charges(&self) -> Vec<Money> {
        lock(&self.charges).clone()
    }

    /// Confirmation emails sent
    pub fn emails(&self) -> Vec<(String, OrderResult)> {
        lock(&self.emails).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct FakeBackend {
    config: FakeServices,
}

impl FakeBackend {
    fn record(&self, call: &str) {
        lock(&self.config.calls).push(call.to_string());
    }
}

#[async_trait]
impl CartService for FakeBackend {
    async fn get_cart(&self, _user_id: &str) -> ServiceResult<Vec<CartItem>> {
        self.record("cart.get_cart");
        if self.config.fail_get_cart {
            return Err(ServiceError::Unavailable("cart store offline".into()));
        }
        Ok(self.config.cart_items.clone())
    }

    async fn empty_cart(&self, _user_id: &str) -> ServiceResult<()> {
        self.record("cart.empty_cart");
        if self.config.fail_empty_cart {
            return Err(ServiceError::Unavailable("cart store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for FakeBackend {
    async fn get_product_price(&self, product_id: &str) -> ServiceResult<Money> {
        self.record("catalog.get_product_price");
        self.config
            .prices
            .get(product_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound {
                what: format!("product {product_id}"),
            })
    }
}

#[async_trait]
impl CurrencyService for FakeBackend {
    async fn convert(&self, from: &Money, to_code: &str) -> ServiceResult<Money> {
        self.record("currency.convert");
        if from.currency_code == to_code {
            return Ok(from.clone());
        }
        let rate = self
            .config
            .rates
            .get(to_code)
            .ok_or_else(|| ServiceError::UnsupportedCurrency {
                currency: to_code.to_string(),
            })?;
        let mut converted = from
            .multiply(*rate)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        converted.currency_code = to_code.to_string();
        Ok(converted)
    }
}

#[async_trait]
impl ShippingService for FakeBackend {
    async fn get_quote(&self, _address: &Address, _items: &[CartItem]) -> ServiceResult<Money> {
        self.record("shipping.get_quote");
        if self.config.fail_quote {
            return Err(ServiceError::Unavailable("no carrier".into()));
        }
        Ok(self
            .config
            .quote
            .clone()
            .unwrap_or_else(|| Money::zero("USD")))
    }

    async fn ship_order(&self, address: &Address, _items: &[CartItem]) -> ServiceResult<String> {
        self.record("shipping.ship_order");
        if self.config.fail_ship {
            return Err(ServiceError::Unavailable("no carrier".into()));
        }
        Ok(ids::tracking_id(address))
    }
}

#[async_trait]
impl PaymentService for FakeBackend {
    async fn charge(&self, amount: &Money, _card: &CreditCard) -> ServiceResult<String> {
        self.record("payment.charge");
        if let Some(delay) = self.config.payment_delay {
            tokio::time::sleep(delay).await;
        }
        if self.config.decline_charge {
            return Err(ServiceError::Declined {
                reason: "card declined".into(),
            });
        }
        lock(&self.config.charges).push(amount.clone());
        Ok(format!("txn-{}", lock(&self.config.charges).len()))
    }
}

#[async_trait]
impl EmailService for FakeBackend {
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> ServiceResult<()> {
        self.record("email.send_order_confirmation");
        if self.config.fail_email {
            return Err(ServiceError::Unavailable("smtp relay down".into()));
        }
        lock(&self.config.emails).push((email.to_string(), order.clone()));
        Ok(())
    }
}
