//! # Order Types
//!
//! Cart snapshots, priced order items and the order result returned by checkout.

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A product and quantity in a user's cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product ID
    pub product_id: String,
    /// Number of units, always > 0
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A cart item priced in the user's currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item: CartItem,
    /// Localized unit price
    pub cost: Money,
}

/// Shipping address, passed through to shipping and email unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(default)]
    pub zip_code: i32,
}

impl Address {
    /// `"street, city, state"` trimmed, whitespace-collapsed and lowercased.
    ///
    /// Two addresses that differ only in spacing or case normalize the same.
    pub fn normalized(&self) -> String {
        [&self.street_address, &self.city, &self.state]
            .iter()
            .map(|part| {
                part.split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase()
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Payment credential handed to the payment service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub number: String,
    pub cvv: u32,
    pub expiration_year: u32,
    pub expiration_month: u32,
}

impl CreditCard {
    /// Card number with all but the last four digits masked
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(|c| c.is_ascii_digit()).collect();
        let visible = digits.len().saturating_sub(4);
        digits
            .iter()
            .enumerate()
            .map(|(i, c)| if i < visible { '*' } else { *c })
            .collect()
    }
}

// Never print the full card number or CVV in logs.
impl fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCard")
            .field("number", &self.masked_number())
            .field("cvv", &"***")
            .field("expiration_year", &self.expiration_year)
            .field("expiration_month", &self.expiration_month)
            .finish()
    }
}

/// Inbound "place order" request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    /// Currency the user is shopping in
    pub user_currency: String,
    pub address: Address,
    pub email: String,
    pub credit_card: CreditCard,
}

/// Cart resolved into priced items and a localized shipping cost.
///
/// Lives for one checkout call.
#[derive(Debug, Clone)]
pub struct OrderPreparation {
    pub order_items: Vec<OrderItem>,
    pub cart_items: Vec<CartItem>,
    pub shipping_cost_localized: Money,
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: String,
    pub shipping_tracking_id: String,
    pub shipping_cost: Money,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,
    /// Amount charged to the card
    pub total: Money,
    pub placed_at: DateTime<Utc>,
}
