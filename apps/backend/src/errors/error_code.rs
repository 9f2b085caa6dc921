//! Error codes for the tasks backend API.
//!
//! Every failure that reaches a client carries exactly one of these codes in
//! the `error_code` field of the error envelope. Add new codes here; never
//! pass ad-hoc strings as error codes.

use core::fmt;

/// Stable external error codes.
///
/// Codes are grouped by prefix: `AUTH_*` for authentication/authorization,
/// `DATA_*` for resource and payload problems, `REQ_*` for request-level
/// rejections and `SYS_*` for anything the server could not handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Credentials missing, malformed, invalid or expired
    InvalidCredentials,
    /// Authenticated identity may not act on the requested subject
    InsufficientPermissions,

    // Resources & payloads
    /// Resource absent, or owned by someone else
    ResourceNotFound,
    /// Payload failed validation
    ValidationError,

    // Request-level
    /// Malformed request
    BadRequest,
    /// Request conflicts with current state (e.g. duplicate email)
    Conflict,
    /// Method not supported on an existing path
    MethodNotAllowed,

    // System
    /// Anything unanticipated
    InternalError,
}

impl ErrorCode {
    /// Returns the canonical string for this error code.
    ///
    /// This is the exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "AUTH_001",
            Self::InsufficientPermissions => "AUTH_003",
            Self::ResourceNotFound => "DATA_001",
            Self::ValidationError => "DATA_002",
            Self::BadRequest => "REQ_001",
            Self::Conflict => "REQ_409",
            Self::MethodNotAllowed => "REQ_405",
            Self::InternalError => "SYS_001",
        }
    }

    /// All codes, for uniqueness checks.
    pub const ALL: [ErrorCode; 8] = [
        Self::InvalidCredentials,
        Self::InsufficientPermissions,
        Self::ResourceNotFound,
        Self::ValidationError,
        Self::BadRequest,
        Self::Conflict,
        Self::MethodNotAllowed,
        Self::InternalError,
    ];
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::InvalidCredentials.as_str(), "AUTH_001");
        assert_eq!(ErrorCode::InsufficientPermissions.as_str(), "AUTH_003");
        assert_eq!(ErrorCode::ResourceNotFound.as_str(), "DATA_001");
        assert_eq!(ErrorCode::ValidationError.as_str(), "DATA_002");
        assert_eq!(ErrorCode::BadRequest.as_str(), "REQ_001");
        assert_eq!(ErrorCode::Conflict.as_str(), "REQ_409");
        assert_eq!(ErrorCode::MethodNotAllowed.as_str(), "REQ_405");
        assert_eq!(ErrorCode::InternalError.as_str(), "SYS_001");
    }

    #[test]
    fn test_codes_are_unique() {
        let unique: HashSet<&str> = ErrorCode::ALL.iter().map(ErrorCode::as_str).collect();
        assert_eq!(unique.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn test_display_trait() {
        assert_eq!(format!("{}", ErrorCode::InvalidCredentials), "AUTH_001");
        assert_eq!(format!("{}", ErrorCode::ResourceNotFound), "DATA_001");
    }
}
