//! HTTP API for the FinPulse ledger and weekly review.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig, ServerConfigError};
pub use error::ApiError;
pub use routes::app;
pub use state::AppState;
