use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::claims::Claims;

/// Identifier of an authenticated principal (the token `sub`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who the current request is acting as.
///
/// Only built from claims that passed verification; inserted into request
/// extensions by `AuthGate` and dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    subject: Subject,
    claims: Claims,
}

impl IdentityContext {
    pub fn from_verified(claims: Claims) -> Self {
        Self {
            subject: claims.sub.clone(),
            claims,
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
