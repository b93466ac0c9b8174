//! # checkout-core
//!
//! Money arithmetic and the order checkout orchestrator.
//!
//! This crate provides:
//! - `Money`, an exact fixed-point currency amount
//! - Service traits (`CartService`, `PaymentService`, ...) for downstream collaborators
//! - `OrderPreparer`, which turns a cart into localized order items
//! - `CheckoutService`, which places an order end to end
//! - Typed errors naming the checkout stage that failed
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutService, PlaceOrderRequest, Services};
//!
//! let checkout = CheckoutService::new(services);
//!
//! match checkout.place_order(&request).await {
//!     Ok(order) => println!("placed {} ({})", order.order_id, order.total),
//!     Err(e) => eprintln!("checkout failed at {}: {}", e.stage(), e),
//! }
//! ```

pub mod checkout;
pub mod error;
pub mod ids;
pub mod money;
pub mod order;
pub mod prepare;
pub mod services;

#[cfg(any(test, feature = "test-util"))]
pub mod fakes;

// Re-exports for convenience
pub use checkout::{CheckoutConfig, CheckoutService, DEFAULT_CALL_TIMEOUT};
pub use error::{
    CheckoutError, CheckoutResult, IdError, PrepareError, PrepareResult, ServiceError, ServiceResult,
    Stage,
};
pub use ids::{tracking_id, IdGenerator, UuidGenerator};
pub use money::{Money, MoneyError, MoneyResult, NANOS_PER_UNIT};
pub use order::{
    Address, CartItem, CreditCard, OrderItem, OrderPreparation, OrderResult, PlaceOrderRequest,
};
pub use prepare::OrderPreparer;
pub use services::{
    call_with_timeout, CartService, CatalogService, CurrencyService, EmailService,
    PaymentService, Services, ShippingService,
};
