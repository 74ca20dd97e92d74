use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::ws::protocol::SessionSnapshot;

#[derive(Serialize)]
struct ResetResponse {
    ok: bool,
    state: SessionSnapshot,
}

async fn get_state(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(app_state.dispatcher().snapshot()))
}

async fn reset(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let state = app_state.dispatcher().reset();
    Ok(HttpResponse::Ok().json(ResetResponse { ok: true, state }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/state").route(web::get().to(get_state)))
        .service(web::resource("/reset").route(web::post().to(reset)));
}
