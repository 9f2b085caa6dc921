//! Backend test support utilities
//!
//! Shared helpers for the backend's integration tests: idempotent logging
//! initialization, unique test data, and assertions for the error envelope.

pub mod error_envelope;
pub mod logging;
pub mod unique_helpers;
