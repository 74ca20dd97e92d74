use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ErrorCode;
use crate::state::AppState;
use crate::ws::hub::Frame;
use crate::ws::protocol::{ClientMsg, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = ControllerSession::new(Uuid::new_v4(), app_state);
    ws::start(session, &req, stream)
}

/// A phone controller: claims a player slot and streams button edges.
pub struct ControllerSession {
    conn_id: Uuid,
    app_state: web::Data<AppState>,
    last_heartbeat: Instant,
}

impl ControllerSession {
    fn new(conn_id: Uuid, app_state: web::Data<AppState>) -> Self {
        Self {
            conn_id,
            app_state,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => {
                warn!(error = %err, "[WS CONTROLLER] failed to serialize outbound message")
            }
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, code: ErrorCode, message: impl Into<String>) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code: code.as_str().to_string(),
                message: message.into(),
            },
        );
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS CONTROLLER] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn announce_availability(&self) {
        self.app_state
            .hub()
            .broadcast_controllers(&ServerMsg::PlayerAvailability {
                taken_players: self.app_state.controllers().taken_players(),
            });
    }

    fn handle_join(&mut self, requested: Option<u8>, ctx: &mut ws::WebsocketContext<Self>) {
        let controllers = self.app_state.controllers();
        let previous = controllers.player_of(self.conn_id);

        match controllers.join(self.conn_id, requested) {
            Ok(player) => {
                Self::send_json(
                    ctx,
                    &ServerMsg::Joined {
                        player,
                        control_hints: self.app_state.dispatcher().control_hints(),
                    },
                );
                if previous == Some(player) {
                    return;
                }
                let hub = self.app_state.hub();
                if let Some(old) = previous {
                    hub.broadcast(&ServerMsg::ControllerLeft { player: old });
                }
                hub.broadcast(&ServerMsg::ControllerJoined { player });
                self.announce_availability();
            }
            Err(err) => {
                info!(conn_id = %self.conn_id, "[WS CONTROLLER] join rejected: {err}");
                Self::send_json(
                    ctx,
                    &ServerMsg::JoinFailed {
                        error: err.to_string(),
                    },
                );
            }
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let Ok(msg) = serde_json::from_str::<ClientMsg>(text) else {
            Self::send_error(ctx, ErrorCode::BadRequest, "Malformed JSON");
            return;
        };

        match msg {
            ClientMsg::Join { player } => self.handle_join(player, ctx),
            ClientMsg::Control { button, pressed } => {
                let dispatcher = self.app_state.dispatcher();
                match self.app_state.controllers().control(
                    self.conn_id,
                    &button,
                    pressed,
                    dispatcher.as_ref(),
                ) {
                    Ok(outcome) => debug!(conn_id = %self.conn_id, ?outcome, "control handled"),
                    Err(err) => Self::send_error(ctx, err.code(), err.to_string()),
                }
            }
            ClientMsg::Result { .. } => {
                Self::send_error(ctx, ErrorCode::BadRequest, "Controllers cannot post results");
            }
        }
    }
}

impl Actor for ControllerSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS CONTROLLER] started");

        self.app_state.controllers().connect(self.conn_id);
        let recipient = ctx.address().recipient::<Frame>();
        self.app_state
            .hub()
            .register_controller(self.conn_id, Arc::new(recipient));
        self.start_heartbeat(ctx);

        Self::send_json(
            ctx,
            &ServerMsg::PlayerAvailability {
                taken_players: self.app_state.controllers().taken_players(),
            },
        );
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.app_state.hub().unregister(self.conn_id);
        if let Some(player) = self.app_state.controllers().disconnect(self.conn_id) {
            self.app_state
                .hub()
                .broadcast(&ServerMsg::ControllerLeft { player });
            self.announce_availability();
        }
        info!(conn_id = %self.conn_id, "[WS CONTROLLER] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ControllerSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                self.app_state.controllers().touch(self.conn_id);
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
                self.app_state.controllers().touch(self.conn_id);
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS CONTROLLER] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Frame> for ControllerSession {
    type Result = ();

    fn handle(&mut self, frame: Frame, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(&*frame.0);
    }
}
