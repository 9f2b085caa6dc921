use std::sync::Arc;

use crate::auth::clock::Clock;
use crate::auth::jwt::TokenService;
use crate::auth::route_classifier::RouteClassifier;
use crate::repos::tasks::TaskStore;
use crate::repos::users::UserStore;

use super::security_config::SecurityConfig;

/// Application state shared by all workers.
///
/// Everything here is either immutable after startup (security config,
/// token keys, route table) or a store that owns its own synchronization.
/// Per-request identity never lives here.
#[derive(Clone)]
pub struct AppState {
    pub security: SecurityConfig,
    pub tokens: Arc<TokenService>,
    pub routes: Arc<RouteClassifier>,
    pub clock: Clock,
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl AppState {
    pub fn now(&self) -> std::time::SystemTime {
        self.clock.now()
    }
}
