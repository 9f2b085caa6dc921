//! Token lifecycle, route classification and ownership enforcement.

pub mod claims;
pub mod clock;
pub mod identity;
pub mod jwt;
pub mod ownership;
pub mod route_classifier;

pub use claims::Claims;
pub use clock::{Clock, ManualClock};
pub use identity::{IdentityContext, Subject};
pub use jwt::{TokenError, TokenService};
pub use ownership::OwnedResource;
pub use route_classifier::{RouteClass, RouteClassifier, RouteMatcher, RouteRule};
