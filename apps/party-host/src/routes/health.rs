use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::AppState;
use crate::ws::protocol::ActiveRunView;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    app_version: String,
    games_dir: String,
    active_run: Option<ActiveRunView>,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let app_version = env!("CARGO_PKG_VERSION").to_string();

    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let dispatcher = app_state.dispatcher();
    let response = HealthResponse {
        status: "ok".to_string(),
        app_version,
        games_dir: dispatcher.registry().minigames_dir().display().to_string(),
        active_run: dispatcher.active_run(),
        time,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(health)));
}
