use actix_web::{web, App, HttpServer};
use tasks_backend::config::Settings;
use tasks_backend::middleware::{
    cors_middleware, AuthGate, ErrorBoundary, RequestTrace, StructuredLogger, TraceSpan,
};
use tasks_backend::routes;
use tasks_backend::state::build_state;
use tasks_backend::telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Environment variables must be set by the runtime environment
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    telemetry::init_tracing(settings.log_level.as_deref());

    let app_state = match build_state()
        .with_security(settings.security_config())
        .build()
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        host = %settings.host,
        port = settings.port,
        algorithm = ?settings.jwt_algorithm,
        token_ttl_secs = settings.token_ttl().as_secs(),
        origins = ?settings.allowed_origins,
        "starting server"
    );

    let gate = AuthGate::from_state(&app_state);
    let origins = settings.allowed_origins.clone();
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(gate.clone())
            .wrap(ErrorBoundary)
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
            .default_service(web::to(routes::not_found))
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
