//! # Checkout Orchestrator
//!
//! Places one order by driving the downstream services in a fixed order:
//!
//! ```text
//! START → PREPARING → CHARGING → SHIPPING → CLEARING_CART → NOTIFYING → DONE
//! ```
//!
//! Each stage is a method that takes the previous stage's output. Failures in
//! preparing, charging or shipping abort the checkout. Failures in clearing the
//! cart or sending the confirmation are logged and otherwise ignored: by then
//! the order is placed.
//!
//! A successful charge followed by a failed shipment is not refunded here.

use crate::error::{CheckoutError, CheckoutResult, Stage};
use crate::ids::{self, IdGenerator, UuidGenerator};
use crate::money::{Money, MoneyError};
use crate::order::{OrderPreparation, OrderResult, PlaceOrderRequest};
use crate::prepare::OrderPreparer;
use crate::services::{call_with_timeout, Services};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

/// Default bound on every downstream call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(800);

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Bound on each individual downstream call
    pub call_timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Output of PREPARING
struct Prepared {
    order_id: String,
    prep: OrderPreparation,
    total: Money,
}

/// Output of CHARGING
struct Charged {
    prepared: Prepared,
    transaction_id: String,
}

/// Output of SHIPPING
struct Shipped {
    charged: Charged,
    tracking_id: String,
}

/// Places orders against a set of downstream services
#[derive(Clone)]
pub struct CheckoutService {
    services: Services,
    ids: Arc<dyn IdGenerator>,
    config: CheckoutConfig,
}

impl CheckoutService {
    /// Create a checkout service with random order IDs and default settings
    pub fn new(services: Services) -> Self {
        Self {
            services,
            ids: Arc::new(UuidGenerator),
            config: CheckoutConfig::default(),
        }
    }

    /// Builder: use a different order ID source
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Builder: override settings
    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Place an order that cannot be cancelled by the caller.
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> CheckoutResult<OrderResult> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.place_order_cancellable(request, cancel_rx).await
    }

    /// Place an order, checking `cancel` between stages.
    ///
    /// A stage already in flight always runs to completion or to its timeout.
    /// Cancellation seen before shipping aborts with [`CheckoutError::Cancelled`];
    /// once the shipment is dispatched the order stands, so cancellation only
    /// skips the remaining cart and email steps.
    #[instrument(
        skip(self, request, cancel),
        fields(user_id = %request.user_id, user_currency = %request.user_currency)
    )]
    pub async fn place_order_cancellable(
        &self,
        request: &PlaceOrderRequest,
        cancel: watch::Receiver<bool>,
    ) -> CheckoutResult<OrderResult> {
        info!(
            "[PlaceOrder] user_id={:?} user_currency={:?}",
            request.user_id, request.user_currency
        );

        let order_id = self.ids.order_id().map_err(|e| {
            error!("failed to generate order id: {}", e);
            CheckoutError::IdGenerationFailed(e)
        })?;

        ensure_active(&cancel, Stage::Preparing)?;
        let prepared = self.prepare(request, order_id).await?;

        ensure_active(&cancel, Stage::Charging)?;
        let charged = self.charge(request, prepared).await?;

        ensure_active(&cancel, Stage::Shipping)?;
        let shipped = self.ship(request, charged).await?;

        Ok(self.complete(request, shipped, &cancel).await)
    }

    async fn prepare(&self, request: &PlaceOrderRequest, order_id: String) -> CheckoutResult<Prepared> {
        let prep = OrderPreparer::new(&self.services, self.config.call_timeout)
            .prepare(&request.user_id, &request.user_currency, &request.address)
            .await
            .map_err(|e| {
                error!(order_id = %order_id, "failed to prepare order: {}", e);
                CheckoutError::from(e)
            })?;

        let total = order_total(&prep, &request.user_currency)?;
        info!(
            order_id = %order_id,
            items = prep.order_items.len(),
            total = %total,
            "order prepared"
        );

        Ok(Prepared {
            order_id,
            prep,
            total,
        })
    }

    async fn charge(&self, request: &PlaceOrderRequest, prepared: Prepared) -> CheckoutResult<Charged> {
        let transaction_id = call_with_timeout(
            self.config.call_timeout,
            self.services
                .payment
                .charge(&prepared.total, &request.credit_card),
        )
        .await
        .map_err(|e| {
            error!(order_id = %prepared.order_id, "could not charge the card: {}", e);
            CheckoutError::ChargeFailed(e)
        })?;

        info!("payment went through (transaction_id: {})", transaction_id);
        Ok(Charged {
            prepared,
            transaction_id,
        })
    }

    async fn ship(&self, request: &PlaceOrderRequest, charged: Charged) -> CheckoutResult<Shipped> {
        let tracking_id = call_with_timeout(
            self.config.call_timeout,
            self.services
                .shipping
                .ship_order(&request.address, &charged.prepared.prep.cart_items),
        )
        .await
        .map_err(|e| {
            // The card is already charged; this needs reconciling by hand.
            error!(
                order_id = %charged.prepared.order_id,
                transaction_id = %charged.transaction_id,
                address = %ids::address_fingerprint(&request.address),
                "shipment failed after successful charge: {}",
                e
            );
            CheckoutError::ShipmentFailed(e)
        })?;

        info!(tracking_id = %tracking_id, "shipment dispatched");
        Ok(Shipped {
            charged,
            tracking_id,
        })
    }

    /// CLEARING_CART and NOTIFYING. Neither can fail the checkout.
    async fn complete(
        &self,
        request: &PlaceOrderRequest,
        shipped: Shipped,
        cancel: &watch::Receiver<bool>,
    ) -> OrderResult {
        let Shipped {
            charged,
            tracking_id,
        } = shipped;
        let Prepared {
            order_id,
            prep,
            total,
        } = charged.prepared;

        if is_cancelled(cancel) {
            warn!(order_id = %order_id, "checkout cancelled after shipment, not emptying cart");
        } else if let Err(e) = call_with_timeout(
            self.config.call_timeout,
            self.services.cart.empty_cart(&request.user_id),
        )
        .await
        {
            observe(CheckoutError::CartClearFailed(e));
        }

        let order = OrderResult {
            order_id,
            shipping_tracking_id: tracking_id,
            shipping_cost: prep.shipping_cost_localized,
            shipping_address: request.address.clone(),
            items: prep.order_items,
            total,
            placed_at: Utc::now(),
        };

        if is_cancelled(cancel) {
            warn!(order_id = %order.order_id, "checkout cancelled after shipment, not sending confirmation");
            return order;
        }

        match call_with_timeout(
            self.config.call_timeout,
            self.services
                .email
                .send_order_confirmation(&request.email, &order),
        )
        .await
        {
            Ok(()) => info!("order confirmation email sent to {:?}", request.email),
            Err(e) => observe(CheckoutError::NotificationFailed(e)),
        }

        order
    }
}

/// Shipping plus every line's unit cost times quantity.
///
/// Overflow is a data problem and comes back as [`CheckoutError::Total`].
/// The preparer has already checked every amount is in `currency`, so a
/// mismatch here is a bug and panics via [`Money::must_sum`].
fn order_total(prep: &OrderPreparation, currency: &str) -> CheckoutResult<Money> {
    let mut total = add_to_total(&Money::zero(currency), &prep.shipping_cost_localized)?;
    for item in &prep.order_items {
        let line = item
            .cost
            .multiply(item.item.quantity)
            .map_err(CheckoutError::Total)?;
        total = add_to_total(&total, &line)?;
    }
    Ok(total)
}

fn add_to_total(total: &Money, amount: &Money) -> CheckoutResult<Money> {
    match total.sum(amount) {
        Ok(sum) => Ok(sum),
        Err(e @ MoneyError::ArithmeticOverflow { .. }) => Err(CheckoutError::Total(e)),
        Err(_) => Ok(total.must_sum(amount)),
    }
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

fn ensure_active(cancel: &watch::Receiver<bool>, next: Stage) -> CheckoutResult<()> {
    if is_cancelled(cancel) {
        warn!(stage = %next, "checkout cancelled");
        return Err(CheckoutError::Cancelled { stage: next });
    }
    Ok(())
}

/// Log a tolerated failure
fn observe(err: CheckoutError) {
    warn!(stage = %err.stage(), fatal = err.is_fatal(), "{}", err);
}
