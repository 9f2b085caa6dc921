//! Security-relevant events, one function per event name.
//!
//! Every event carries the request's trace id. Emails go through
//! [`Redacted`]; tokens are never logged.

use tracing::{info, warn};

use crate::auth::identity::Subject;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Gate refused a request before it reached a handler.
pub fn auth_rejected(path: &str, reason: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_AUTH_REJECTED",
        %trace_id,
        path,
        reason,
        "Request rejected by authentication gate"
    );
}

/// An authenticated caller tried to act on behalf of someone else.
pub fn forbidden(subject: &Subject, target: &str, action: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_FORBIDDEN",
        %trace_id,
        subject = %subject,
        target,
        action,
        "Cross-identity access refused"
    );
}

pub fn login_failed(reason: &str, email: Option<&str>) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        email = %Redacted(email.unwrap_or("")),
        reason,
        "Authentication failure"
    );
}

pub fn user_registered(subject: &Subject, email: &str) {
    let trace_id = trace_ctx::trace_id();

    info!(
        event = "SECURITY_USER_REGISTRATION",
        %trace_id,
        subject = %subject,
        email = %Redacted(email),
        "User registered"
    );
}

pub fn user_login(subject: &Subject) {
    let trace_id = trace_ctx::trace_id();

    info!(event = "SECURITY_USER_LOGIN", %trace_id, subject = %subject, "User logged in");
}

pub fn user_logout(subject: Option<&Subject>) {
    let trace_id = trace_ctx::trace_id();
    let subject = subject.map(Subject::as_str).unwrap_or("anonymous");

    info!(event = "SECURITY_USER_LOGOUT", %trace_id, subject, "User logged out");
}

pub fn token_refreshed(subject: &Subject) {
    let trace_id = trace_ctx::trace_id();

    info!(event = "SECURITY_TOKEN_REFRESH", %trace_id, subject = %subject, "Access token refreshed");
}
