use actix_web::web;

pub mod games;
pub mod health;
pub mod realtime;
pub mod session;

/// Registers every endpoint. Used by `main.rs` and by tests, so both serve
/// the same paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Catalog and run routes: /games, /run/**
    games::configure_routes(cfg);

    // Session routes: /state, /reset
    session::configure_routes(cfg);

    // Realtime routes: /ws, /ws/controller
    realtime::configure_routes(cfg);
}
