//! # checkout-api
//!
//! HTTP front door for the checkout orchestrator.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/` | Health check |
//! | POST | `/api/v1/orders` | Place an order for the user's cart |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat};
