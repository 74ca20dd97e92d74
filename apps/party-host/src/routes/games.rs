use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{PrizeResult, RawResult};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::game_id::GameId;
use crate::manifest::{ExecutionMode, GameDescriptor};
use crate::services::dispatcher::SettledRun;
use crate::services::RunOutcome;
use crate::state::AppState;

#[derive(Serialize)]
struct GamesResponse {
    ok: bool,
    games: Vec<GameDescriptor>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunResponse {
    ok: bool,
    run_id: Uuid,
    mode: ExecutionMode,
    game: GameDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<RawResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prizes: Option<PrizeResult>,
    pending: bool,
}

impl RunResponse {
    fn settled(run: SettledRun) -> Self {
        Self {
            ok: true,
            run_id: run.run_id,
            mode: run.game.execution_mode,
            game: run.game,
            result: Some(run.result),
            prizes: Some(run.prizes),
            pending: false,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelResponse {
    ok: bool,
    run_id: Uuid,
}

async fn list_games(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let games = app_state.dispatcher().registry().list_games();
    Ok(HttpResponse::Ok().json(GamesResponse { ok: true, games }))
}

async fn run_game(
    game_id: GameId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let outcome = app_state.dispatcher().run(game_id.as_str()).await?;

    let body = match outcome {
        RunOutcome::Settled(run) => RunResponse::settled(run),
        RunOutcome::Pending { run_id, game } => RunResponse {
            ok: true,
            run_id,
            mode: game.execution_mode,
            game,
            result: None,
            prizes: None,
            pending: true,
        },
    };
    Ok(HttpResponse::Ok().json(body))
}

/// Browser result over HTTP; same validation as the display `RESULT` frame.
async fn post_result(
    payload: web::Json<Value>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let settled = app_state
        .dispatcher()
        .submit_browser_result(&payload.into_inner())?;
    Ok(HttpResponse::Ok().json(RunResponse::settled(settled)))
}

async fn cancel_run(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let run_id = app_state.dispatcher().cancel_active()?;
    Ok(HttpResponse::Ok().json(CancelResponse { ok: true, run_id }))
}

/// Body parse failures use the `{ok:false}` envelope instead of actix's plain text.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::bad_request(ErrorCode::BadRequest, format!("Invalid JSON body: {err}")).into()
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/games").route(web::get().to(list_games)))
        // Fixed paths before the `{game_id}` pattern so they are not shadowed.
        .service(
            web::resource("/run/result")
                .app_data(json_config())
                .route(web::post().to(post_result)),
        )
        .service(web::resource("/run/cancel").route(web::post().to(cancel_run)))
        .service(web::resource("/run/{game_id}").route(web::post().to(run_game)));
}
