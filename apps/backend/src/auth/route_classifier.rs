//! Startup-computed table of which paths skip authentication.
//!
//! Built once from a list of [`RouteRule`]s into an exact-match set plus a
//! compiled [`RegexSet`]; per-request lookup does no allocation and no I/O.

use std::collections::HashSet;

use regex::{Regex, RegexSet};

/// API prefixes whose auth endpoints are public.
pub const DEFAULT_API_PREFIXES: &[&str] = &["/api/v1", "/api/auth"];

/// Endpoints that must be reachable without a token under every API prefix.
pub const PUBLIC_AUTH_ENDPOINTS: &[&str] = &["register", "login", "logout", "refresh"];

/// Root, health and API description artifacts.
const PUBLIC_EXACT_PATHS: &[&str] = &[
    "/",
    "/health",
    "/docs",
    "/redoc",
    "/openapi.json",
    "/swagger.json",
];

/// Interactive documentation and its assets.
const PUBLIC_DOC_PATTERNS: &[&str] = &[
    r"^/docs(/.*)?$",
    r"^/redoc(/.*)?$",
    r"^/swagger-ui(/.*)?$",
];

#[derive(Debug, Clone)]
pub enum RouteMatcher {
    Exact(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub matcher: RouteMatcher,
    pub requires_auth: bool,
}

impl RouteRule {
    pub fn public_exact(path: impl Into<String>) -> Self {
        Self {
            matcher: RouteMatcher::Exact(path.into()),
            requires_auth: false,
        }
    }

    pub fn public_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            matcher: RouteMatcher::Pattern(Regex::new(pattern)?),
            requires_auth: false,
        })
    }

    /// Carve a path back out of a broader public pattern.
    pub fn protected_exact(path: impl Into<String>) -> Self {
        Self {
            matcher: RouteMatcher::Exact(path.into()),
            requires_auth: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

#[derive(Debug)]
pub struct RouteClassifier {
    public_exact: HashSet<String>,
    public_patterns: RegexSet,
    protected_exact: HashSet<String>,
    protected_patterns: RegexSet,
}

impl RouteClassifier {
    /// Compile `rules`. Protected rules win over public ones.
    pub fn from_rules(rules: impl IntoIterator<Item = RouteRule>) -> Result<Self, regex::Error> {
        let mut public_exact = HashSet::new();
        let mut public_patterns = Vec::new();
        let mut protected_exact = HashSet::new();
        let mut protected_patterns = Vec::new();

        for rule in rules {
            match (rule.matcher, rule.requires_auth) {
                (RouteMatcher::Exact(path), false) => {
                    public_exact.insert(path);
                }
                (RouteMatcher::Exact(path), true) => {
                    protected_exact.insert(path);
                }
                (RouteMatcher::Pattern(re), false) => public_patterns.push(re.as_str().to_string()),
                (RouteMatcher::Pattern(re), true) => {
                    protected_patterns.push(re.as_str().to_string())
                }
            }
        }

        Ok(Self {
            public_exact,
            public_patterns: RegexSet::new(public_patterns)?,
            protected_exact,
            protected_patterns: RegexSet::new(protected_patterns)?,
        })
    }

    /// The service's rule set: fixed public paths, documentation patterns,
    /// and register/login/logout/refresh under each of `api_prefixes`.
    pub fn standard<S: AsRef<str>>(api_prefixes: &[S]) -> Result<Self, regex::Error> {
        Self::from_rules(standard_rules(api_prefixes)?)
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.protected_exact.contains(path) || self.protected_patterns.is_match(path) {
            return RouteClass::Protected;
        }
        if self.public_exact.contains(path) || self.public_patterns.is_match(path) {
            return RouteClass::Public;
        }
        RouteClass::Protected
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.classify(path) == RouteClass::Public
    }
}

pub fn standard_rules<S: AsRef<str>>(api_prefixes: &[S]) -> Result<Vec<RouteRule>, regex::Error> {
    let mut rules: Vec<RouteRule> = PUBLIC_EXACT_PATHS
        .iter()
        .map(|p| RouteRule::public_exact(*p))
        .collect();

    for pattern in PUBLIC_DOC_PATTERNS {
        rules.push(RouteRule::public_pattern(pattern)?);
    }

    for prefix in api_prefixes {
        let prefix = prefix.as_ref().trim_end_matches('/');
        for endpoint in PUBLIC_AUTH_ENDPOINTS {
            rules.push(RouteRule::public_exact(format!("{prefix}/{endpoint}")));
        }
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RouteClassifier {
        RouteClassifier::standard(DEFAULT_API_PREFIXES).unwrap()
    }

    #[test]
    fn test_exact_public_paths() {
        let c = classifier();
        for path in ["/", "/health", "/docs", "/redoc", "/openapi.json", "/swagger.json"] {
            assert!(c.is_public(path), "{path} should be public");
        }
    }

    #[test]
    fn test_doc_subpaths_are_public() {
        let c = classifier();
        assert!(c.is_public("/docs/oauth2-redirect"));
        assert!(c.is_public("/redoc/assets/app.js"));
        assert!(c.is_public("/swagger-ui/index.html"));
        assert!(!c.is_public("/docsx"));
        assert!(!c.is_public("/api/docs"));
    }

    #[test]
    fn test_auth_endpoints_under_every_prefix() {
        let c = classifier();
        for prefix in DEFAULT_API_PREFIXES {
            for endpoint in PUBLIC_AUTH_ENDPOINTS {
                assert!(c.is_public(&format!("{prefix}/{endpoint}")));
            }
        }
    }

    #[test]
    fn test_everything_else_is_protected() {
        let c = classifier();
        for path in [
            "/api/v1/me",
            "/api/u-1/tasks",
            "/api/u-1/tasks/abc/complete",
            "/api/v1/login/extra",
            "/api/v1/loginx",
            "/healthz",
            "/health/",
            "",
        ] {
            assert_eq!(c.classify(path), RouteClass::Protected, "{path}");
        }
    }

    #[test]
    fn test_protected_rule_overrides_public_pattern() {
        let mut rules = standard_rules(DEFAULT_API_PREFIXES).unwrap();
        rules.push(RouteRule::protected_exact("/docs/internal"));
        let c = RouteClassifier::from_rules(rules).unwrap();

        assert!(c.is_public("/docs/public"));
        assert!(!c.is_public("/docs/internal"));
    }

    #[test]
    fn test_trailing_slash_in_prefix_is_ignored() {
        let c = RouteClassifier::standard(&["/api/v9/"]).unwrap();
        assert!(c.is_public("/api/v9/login"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        assert!(RouteRule::public_pattern("(unclosed").is_err());
    }
}
