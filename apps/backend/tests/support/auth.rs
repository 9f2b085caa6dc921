//! Token helpers for tests

use std::time::SystemTime;

use tasks_backend::auth::identity::Subject;
use tasks_backend::state::app_state::AppState;

/// Mint a token for `sub` at the state's current clock reading.
pub fn mint_test_token(state: &AppState, sub: &str, email: &str) -> String {
    mint_token_at(state, sub, email, state.now())
}

/// Mint a token as if issued at `at`.
pub fn mint_token_at(state: &AppState, sub: &str, email: &str, at: SystemTime) -> String {
    state
        .tokens
        .issue(&Subject::new(sub), email, at)
        .expect("should mint token successfully")
}

/// Full `Authorization` header value including the `Bearer ` prefix
pub fn bearer_header(state: &AppState, sub: &str, email: &str) -> String {
    format!("Bearer {}", mint_test_token(state, sub, email))
}
