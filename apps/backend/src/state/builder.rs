use std::sync::Arc;

use crate::adapters::{InMemoryTaskStore, InMemoryUserStore};
use crate::auth::clock::Clock;
use crate::auth::jwt::TokenService;
use crate::auth::route_classifier::{RouteClassifier, DEFAULT_API_PREFIXES};
use crate::error::AppError;
use crate::repos::tasks::TaskStore;
use crate::repos::users::UserStore;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for [`AppState`] (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    clock: Clock,
    api_prefixes: Vec<String>,
    users: Option<Arc<dyn UserStore>>,
    tasks: Option<Arc<dyn TaskStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            clock: Clock::System,
            api_prefixes: DEFAULT_API_PREFIXES.iter().map(|p| p.to_string()).collect(),
            users: None,
            tasks: None,
        }
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    pub fn with_clock(mut self, clock: impl Into<Clock>) -> Self {
        self.clock = clock.into();
        self
    }

    pub fn with_api_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_task_store(mut self, tasks: Arc<dyn TaskStore>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Compile the route table and derive token keys.
    pub fn build(self) -> Result<AppState, AppError> {
        let routes = RouteClassifier::standard(&self.api_prefixes)
            .map_err(|e| AppError::config(format!("invalid public route pattern: {e}")))?;

        Ok(AppState {
            tokens: Arc::new(TokenService::new(&self.security_config)),
            security: self.security_config,
            routes: Arc::new(routes),
            clock: self.clock,
            users: self
                .users
                .unwrap_or_else(|| Arc::new(InMemoryUserStore::default())),
            tasks: self
                .tasks
                .unwrap_or_else(|| Arc::new(InMemoryTaskStore::default())),
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
