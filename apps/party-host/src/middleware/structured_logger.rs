use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Emits one `request_completed` event per request, tagged with the game the
/// request addressed and the error code it failed with.
///
/// A failing minigame (timeout, crash, bad output, runner down) is logged at
/// `warn`: the host itself answered correctly.
pub struct StructuredLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Info,
    Warn,
    Error,
}

fn is_game_failure(code: ErrorCode) -> bool {
    matches!(
        code,
        ErrorCode::RunTimeout
            | ErrorCode::ProcessFailed
            | ErrorCode::MalformedResult
            | ErrorCode::RemoteFailed
            | ErrorCode::RunCancelled
    )
}

fn severity(status: StatusCode, code: Option<ErrorCode>) -> Severity {
    if code.is_some_and(is_game_failure) {
        Severity::Warn
    } else if status.is_server_error() {
        Severity::Error
    } else if status.is_client_error() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// What the access log records about a finished request.
#[derive(Debug, Default, PartialEq, Eq)]
struct Outcome {
    game_id: Option<String>,
    error_code: Option<ErrorCode>,
}

impl Outcome {
    fn of<B>(res: &ServiceResponse<B>) -> Self {
        Self {
            game_id: res.request().match_info().get("game_id").map(str::to_string),
            error_code: res
                .response()
                .error()
                .and_then(|err| err.as_error::<AppError>())
                .map(AppError::code),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let trace_id = req
            .extensions()
            .get::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, outcome) = match &result {
                Ok(res) => (res.status(), Outcome::of(res)),
                Err(err) => (
                    err.as_response_error().status_code(),
                    Outcome {
                        game_id: None,
                        error_code: err.as_error::<AppError>().map(AppError::code),
                    },
                ),
            };

            let duration_us = start.elapsed().as_micros() as u64;
            let status_code = status.as_u16();
            let game_id = outcome.game_id.as_deref();
            let error_code = outcome.error_code.map(|c| c.as_str());

            match severity(status, outcome.error_code) {
                Severity::Error => {
                    error!(http.method=%method, url.path=%path, http.status_code=status_code, duration_us, trace_id=%trace_id, game_id, error.code=error_code, message="request_completed")
                }
                Severity::Warn => {
                    warn!(http.method=%method, url.path=%path, http.status_code=status_code, duration_us, trace_id=%trace_id, game_id, error.code=error_code, message="request_completed")
                }
                Severity::Info => {
                    info!(http.method=%method, url.path=%path, http.status_code=status_code, duration_us, trace_id=%trace_id, game_id, error.code=error_code, message="request_completed")
                }
            }

            result
        })
    }
}
