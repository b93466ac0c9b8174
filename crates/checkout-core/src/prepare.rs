//! # Order Preparation
//!
//! Resolves a user's cart into localized order items and a localized shipping
//! cost. Each step needs the previous step's output, so calls run one at a
//! time and the first failure aborts the whole preparation.

use crate::error::{PrepareError, PrepareResult, ServiceError, ServiceResult};
use crate::money::Money;
use crate::order::{Address, CartItem, OrderItem, OrderPreparation};
use crate::services::{call_with_timeout, Services};
use std::time::Duration;
use tracing::debug;

/// Builds an [`OrderPreparation`] from the cart, catalog, shipping and currency services
pub struct OrderPreparer<'a> {
    services: &'a Services,
    call_timeout: Duration,
}

impl<'a> OrderPreparer<'a> {
    pub fn new(services: &'a Services, call_timeout: Duration) -> Self {
        Self {
            services,
            call_timeout,
        }
    }

    /// Fetch the cart, price every item, and quote shipping, all in `user_currency`.
    pub async fn prepare(
        &self,
        user_id: &str,
        user_currency: &str,
        address: &Address,
    ) -> PrepareResult<OrderPreparation> {
        let cart_items = call_with_timeout(self.call_timeout, self.services.cart.get_cart(user_id))
            .await
            .and_then(checked_quantities)
            .map_err(PrepareError::CartUnavailable)?;
        debug!(user_id, items = cart_items.len(), "fetched cart");

        let order_items = self.price_items(&cart_items, user_currency).await?;

        let shipping_base = call_with_timeout(
            self.call_timeout,
            self.services.shipping.get_quote(address, &cart_items),
        )
        .await
        .and_then(|quote| checked(quote, None))
        .map_err(PrepareError::ShippingQuoteFailed)?;

        let shipping_cost_localized = self
            .convert(&shipping_base, user_currency)
            .await
            .map_err(|source| PrepareError::ConversionFailed {
                what: "shipping cost".to_string(),
                currency: user_currency.to_string(),
                source,
            })?;

        Ok(OrderPreparation {
            order_items,
            cart_items,
            shipping_cost_localized,
        })
    }

    async fn price_items(
        &self,
        items: &[CartItem],
        user_currency: &str,
    ) -> PrepareResult<Vec<OrderItem>> {
        let mut out = Vec::with_capacity(items.len());

        for item in items {
            let price = call_with_timeout(
                self.call_timeout,
                self.services.catalog.get_product_price(&item.product_id),
            )
            .await
            .and_then(|price| checked(price, None))
            .map_err(|source| PrepareError::PricingFailed {
                product_id: item.product_id.clone(),
                source,
            })?;

            let cost = self.convert(&price, user_currency).await.map_err(|source| {
                PrepareError::ConversionFailed {
                    what: format!("price of {}", item.product_id),
                    currency: user_currency.to_string(),
                    source,
                }
            })?;

            out.push(OrderItem {
                item: item.clone(),
                cost,
            });
        }

        Ok(out)
    }

    async fn convert(&self, from: &Money, to_code: &str) -> ServiceResult<Money> {
        let converted =
            call_with_timeout(self.call_timeout, self.services.currency.convert(from, to_code))
                .await?;
        checked(converted, Some(to_code))
    }
}

/// Every cart line must order at least one unit
fn checked_quantities(items: Vec<CartItem>) -> ServiceResult<Vec<CartItem>> {
    match items.iter().find(|item| item.quantity == 0) {
        Some(item) => Err(ServiceError::InvalidResponse(format!(
            "cart line {:?} has quantity 0",
            item.product_id
        ))),
        None => Ok(items),
    }
}

/// Reject amounts that are invalid or, when `currency` is given, in the wrong currency.
fn checked(money: Money, currency: Option<&str>) -> ServiceResult<Money> {
    money
        .validate()
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
    match currency {
        Some(code) if money.currency_code != code => Err(ServiceError::InvalidResponse(format!(
            "expected amount in {code}, got {}",
            money.currency_code
        ))),
        _ => Ok(money),
    }
}
