use actix_web::{web, App, HttpServer};
use party_host::config::HostConfig;
use party_host::infra::state::build_state;
use party_host::middleware::cors::cors_middleware;
use party_host::middleware::request_trace::RequestTrace;
use party_host::middleware::structured_logger::StructuredLogger;
use party_host::middleware::trace_span::TraceSpan;
use party_host::routes;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match HostConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let bind = (config.bind_host.clone(), config.port);
    let cors_origins = config.cors_allowed_origins.clone();

    println!("🚀 Starting party host on http://{}:{}", bind.0, bind.1);
    println!("🎮 Minigames from {}", config.minigames_dir.display());

    let app_state = match build_state().with_config(config).build() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&cors_origins))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((bind.0.as_str(), bind.1))?
    .run()
    .await
}
