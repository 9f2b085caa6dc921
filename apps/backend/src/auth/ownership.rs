//! Ownership checks used by resource services.
//!
//! Two separate predicates:
//! - path subject: the `{user_id}` segment must be the caller. A mismatch is
//!   `Forbidden`; no lookup happens.
//! - resource owner: a loaded resource must belong to the caller. A mismatch
//!   is reported exactly like a missing resource (`NotFound`).

use crate::auth::identity::{IdentityContext, Subject};
use crate::error::AppError;
use crate::logging::security;

/// Anything with a single owning identity.
pub trait OwnedResource {
    fn owner(&self) -> &Subject;
}

/// True when the subject named in the path is the authenticated caller.
pub fn path_subject_matches(identity: &IdentityContext, path_subject: &str) -> bool {
    identity.subject().as_str() == path_subject
}

/// True when `resource` belongs to the authenticated caller.
pub fn is_owned_by<R: OwnedResource + ?Sized>(resource: &R, identity: &IdentityContext) -> bool {
    resource.owner() == identity.subject()
}

pub fn ensure_path_subject(identity: &IdentityContext, path_subject: &str) -> Result<(), AppError> {
    if path_subject_matches(identity, path_subject) {
        return Ok(());
    }
    security::forbidden(identity.subject(), path_subject, "path_subject");
    Err(AppError::forbidden(
        "Not authorized to access another user's resources",
    ))
}

/// Pass through a lookup result only if it exists and belongs to the caller.
///
/// `not_found_detail` is used for both the absent and the foreign case so
/// the two responses cannot be told apart.
pub fn ensure_owned<R: OwnedResource>(
    identity: &IdentityContext,
    resource: Option<R>,
    not_found_detail: &str,
) -> Result<R, AppError> {
    match resource {
        Some(r) if is_owned_by(&r, identity) => Ok(r),
        _ => Err(AppError::not_found(not_found_detail)),
    }
}

/// A resource about to be created must name the caller as its owner.
pub fn ensure_creation_owner(
    identity: &IdentityContext,
    declared_owner: &Subject,
) -> Result<(), AppError> {
    if declared_owner == identity.subject() {
        return Ok(());
    }
    security::forbidden(identity.subject(), declared_owner.as_str(), "create");
    Err(AppError::forbidden(
        "Cannot create resources owned by another user",
    ))
}
