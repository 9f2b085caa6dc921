pub mod auth_gate;
pub mod cors;
pub mod error_boundary;
pub mod request_trace;
pub mod structured_logger;
pub mod trace_span;

pub use auth_gate::AuthGate;
pub use cors::cors_middleware;
pub use error_boundary::ErrorBoundary;
pub use request_trace::RequestTrace;
pub use structured_logger::StructuredLogger;
pub use trace_span::TraceSpan;
