#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod auth;
pub mod config;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod trace_ctx;

// Re-exports for public API
pub use auth::{Claims, Clock, IdentityContext, ManualClock, Subject, TokenError, TokenService};
pub use config::Settings;
pub use error::{AppError, ErrorEnvelope};
pub use errors::ErrorCode;
pub use middleware::{
    cors_middleware, AuthGate, ErrorBoundary, RequestTrace, StructuredLogger, TraceSpan,
};
pub use state::app_state::AppState;
pub use state::builder::{build_state, StateBuilder};
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
