//! # Checkout Error Types
//!
//! Typed errors for collaborator calls, order preparation and checkout.
//! Every checkout error names the stage that produced it.

use crate::money::MoneyError;
use std::fmt;
use thiserror::Error;

/// Failure reported by (or while calling) a downstream service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The requested entity does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// The service answered but could not serve the request
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The payment was declined
    #[error("declined: {reason}")]
    Declined { reason: String },

    /// Currency conversion to this code is not supported
    #[error("unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// The service answered with something we cannot use
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The call did not complete within the per-call timeout
    #[error("timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),
}

impl ServiceError {
    /// Returns true if this error is transient at the transport level.
    ///
    /// Checkout never retries; this is for logging and for transports.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::Unavailable(_) | ServiceError::Timeout { .. } | ServiceError::Network(_)
        )
    }
}

/// Result type alias for collaborator calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Checkout stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    GenerateId,
    Preparing,
    Total,
    Charging,
    Shipping,
    ClearingCart,
    Notifying,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::GenerateId => "generate_id",
            Stage::Preparing => "preparing",
            Stage::Total => "total",
            Stage::Charging => "charging",
            Stage::Shipping => "shipping",
            Stage::ClearingCart => "clearing_cart",
            Stage::Notifying => "notifying",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while turning a cart into an order draft
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepareError {
    #[error("cart failure: {0}")]
    CartUnavailable(#[source] ServiceError),

    #[error("failed to price product {product_id:?}: {source}")]
    PricingFailed {
        product_id: String,
        #[source]
        source: ServiceError,
    },

    #[error("shipping quote failure: {0}")]
    ShippingQuoteFailed(#[source] ServiceError),

    #[error("failed to convert {what} to {currency}: {source}")]
    ConversionFailed {
        what: String,
        currency: String,
        #[source]
        source: ServiceError,
    },
}

/// Result type alias for order preparation
pub type PrepareResult<T> = Result<T, PrepareError>;

/// Failure to mint an order ID
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Error returned by checkout, or logged for the tolerated stages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("failed to generate order id: {0}")]
    IdGenerationFailed(#[source] IdError),

    #[error("failed to prepare order: {0}")]
    Preparation(#[from] PrepareError),

    #[error("failed to compute order total: {0}")]
    Total(#[source] MoneyError),

    #[error("failed to charge card: {0}")]
    ChargeFailed(#[source] ServiceError),

    #[error("shipping error: {0}")]
    ShipmentFailed(#[source] ServiceError),

    #[error("failed to empty user cart: {0}")]
    CartClearFailed(#[source] ServiceError),

    #[error("failed to send order confirmation: {0}")]
    NotificationFailed(#[source] ServiceError),

    #[error("checkout cancelled before {stage}")]
    Cancelled { stage: Stage },
}

impl CheckoutError {
    /// The stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            CheckoutError::IdGenerationFailed(_) => Stage::GenerateId,
            CheckoutError::Preparation(_) => Stage::Preparing,
            CheckoutError::Total(_) => Stage::Total,
            CheckoutError::ChargeFailed(_) => Stage::Charging,
            CheckoutError::ShipmentFailed(_) => Stage::Shipping,
            CheckoutError::CartClearFailed(_) => Stage::ClearingCart,
            CheckoutError::NotificationFailed(_) => Stage::Notifying,
            CheckoutError::Cancelled { stage } => *stage,
        }
    }

    /// Returns false for failures that are logged but never abort checkout
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            CheckoutError::CartClearFailed(_) | CheckoutError::NotificationFailed(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::IdGenerationFailed(_) => 500,
            CheckoutError::Preparation(_) => 500,
            CheckoutError::Total(_) => 500,
            CheckoutError::ChargeFailed(ServiceError::Declined { .. }) => 402,
            CheckoutError::ChargeFailed(_) => 502,
            CheckoutError::ShipmentFailed(_) => 503,
            CheckoutError::CartClearFailed(_) => 500,
            CheckoutError::NotificationFailed(_) => 500,
            CheckoutError::Cancelled { .. } => 503,
        }
    }
}

/// Result type alias for checkout
pub type CheckoutResult<T> = Result<T, CheckoutError>;
