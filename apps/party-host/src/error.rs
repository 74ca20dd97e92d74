use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::{ErrorCode, RunError};
use crate::trace_ctx;

/// Failure body returned by every endpoint: `{ok:false, error, ...}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
    pub code: String,
    pub status: u16,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Run failed: {0}")]
    Run(RunError),
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::BadRequest { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::Run(err) => err.code(),
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { code, .. } => *code,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::BadRequest { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Config { detail }
            | AppError::Internal { detail, .. } => detail.clone(),
            AppError::Run(err) => err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Run(err) => match err {
                RunError::NotFound(_) => StatusCode::NOT_FOUND,
                RunError::AlreadyRunning { .. }
                | RunError::NoActiveRun
                | RunError::Cancelled
                | RunError::ResultMismatch { .. } => StatusCode::CONFLICT,
                RunError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                RunError::ProcessFailed { .. }
                | RunError::Spawn(_)
                | RunError::MalformedResult { .. }
                | RunError::RemoteFailed(_) => StatusCode::BAD_GATEWAY,
            },
            AppError::Config { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::InternalError,
            detail: detail.into(),
        }
    }
}

impl From<RunError> for AppError {
    fn from(err: RunError) -> Self {
        AppError::Run(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::internal(format!("io error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let trace_id = trace_ctx::trace_id();
        let diagnostics = match self {
            AppError::Run(err) => err.diagnostics(),
            _ => None,
        };

        let body = ErrorBody {
            ok: false,
            error: self.detail(),
            code: self.code().as_str().to_string(),
            status: status.as_u16(),
            trace_id: trace_id.clone(),
            diagnostics,
        };

        HttpResponse::build(status)
            .insert_header(("x-trace-id", trace_id))
            .json(body)
    }
}
