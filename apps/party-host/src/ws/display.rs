use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
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
    let session = DisplaySession::new(Uuid::new_v4(), app_state);
    ws::start(session, &req, stream)
}

/// A big-screen client: receives every broadcast and posts browser results.
pub struct DisplaySession {
    conn_id: Uuid,
    app_state: web::Data<AppState>,
    last_heartbeat: Instant,
}

impl DisplaySession {
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
            Err(err) => warn!(error = %err, "[WS DISPLAY] failed to serialize outbound message"),
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
                warn!(conn_id = %actor.conn_id, "[WS DISPLAY] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let Ok(msg) = serde_json::from_str::<ClientMsg>(text) else {
            Self::send_error(ctx, ErrorCode::BadRequest, "Malformed JSON");
            return;
        };

        match msg {
            ClientMsg::Result { payload } => {
                if let Err(err) = self.app_state.dispatcher().submit_browser_result(&payload) {
                    warn!(conn_id = %self.conn_id, error = %err, "[WS DISPLAY] result rejected");
                    Self::send_error(ctx, err.code(), err.to_string());
                }
            }
            ClientMsg::Join { .. } | ClientMsg::Control { .. } => {
                Self::send_error(ctx, ErrorCode::BadRequest, "Displays only send RESULT");
            }
        }
    }
}

impl Actor for DisplaySession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS DISPLAY] started");

        let recipient = ctx.address().recipient::<Frame>();
        self.app_state
            .hub()
            .register_display(self.conn_id, Arc::new(recipient));
        self.start_heartbeat(ctx);

        Self::send_json(
            ctx,
            &ServerMsg::State {
                payload: self.app_state.dispatcher().snapshot(),
            },
        );
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.app_state.hub().unregister(self.conn_id);
        info!(conn_id = %self.conn_id, "[WS DISPLAY] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for DisplaySession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
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
                warn!(conn_id = %self.conn_id, error = %err, "[WS DISPLAY] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Frame> for DisplaySession {
    type Result = ();

    fn handle(&mut self, frame: Frame, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(&*frame.0);
    }
}
