use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use tasks_backend::middleware::{
    cors_middleware, AuthGate, ErrorBoundary, RequestTrace, StructuredLogger, TraceSpan,
};
use tasks_backend::routes;
use tasks_backend::state::app_state::AppState;

/// Type alias for route configuration functions
type RouteConfigFn = Box<dyn Fn(&mut web::ServiceConfig) + Send + Sync>;

/// Builder for creating test Actix service instances
///
/// The middleware stack is the one `main.rs` installs, so gate, error
/// boundary and trace behavior are exercised exactly as in production.
pub struct TestAppBuilder {
    state: AppState,
    route_config: Option<RouteConfigFn>,
}

impl TestAppBuilder {
    /// Create a new TestAppBuilder with the given AppState
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            route_config: None,
        }
    }

    /// Configure the app to use production routes
    pub fn with_prod_routes(mut self) -> Self {
        self.route_config = Some(Box::new(routes::configure) as RouteConfigFn);
        self
    }

    /// Configure the app with custom routes
    pub fn with_routes<F>(mut self, config_fn: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Sync + 'static,
    {
        self.route_config = Some(Box::new(config_fn) as RouteConfigFn);
        self
    }

    /// Build the test service
    pub async fn build(
        self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
        let gate = AuthGate::from_state(&self.state);
        let route_config = self.route_config;
        let origins = vec!["http://localhost:3000".to_string()];

        // Wrap AppState with web::Data at the boundary
        let data = web::Data::new(self.state);

        test::init_service(
            App::new()
                .wrap(gate)
                .wrap(ErrorBoundary)
                .wrap(cors_middleware(&origins))
                .wrap(StructuredLogger)
                .wrap(TraceSpan)
                .wrap(RequestTrace)
                .app_data(data)
                .configure(move |cfg| {
                    if let Some(config_fn) = &route_config {
                        config_fn(cfg);
                    }
                })
                .default_service(web::to(routes::not_found)),
        )
        .await
    }
}

/// Create a new test app builder with the given AppState
///
/// # Example
/// ```rust,ignore
/// let state = build_state().build()?;
/// let app = create_test_app(state).with_prod_routes().build().await;
/// ```
pub fn create_test_app(state: AppState) -> TestAppBuilder {
    TestAppBuilder::new(state)
}
