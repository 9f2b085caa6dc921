//! Test helpers for generating unique test data
//!
//! Every call yields a value no other test in the run will produce, so tests
//! can share one in-memory store without colliding.

use uuid::Uuid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Generate a unique email address with the given local-part prefix
pub fn unique_email(prefix: &str) -> String {
    format!("{}@example.test", unique_str(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_email_shape() {
        let email = unique_email("alice");
        assert!(email.starts_with("alice-"));
        assert!(email.ends_with("@example.test"));
        assert_ne!(email, unique_email("alice"));
    }
}
