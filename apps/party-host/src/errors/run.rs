//! Run-failure taxonomy shared by the execution adapters and the dispatcher.
//!
//! This type is HTTP-agnostic. Handlers convert it into `AppError` through
//! `From<RunError> for AppError`.

use thiserror::Error;

use crate::errors::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("game not found: {0}")]
    NotFound(String),

    #[error("a run is already active for game {active_game}")]
    AlreadyRunning { active_game: String },

    #[error("no active run")]
    NoActiveRun,

    #[error("process timed out after {secs}s")]
    Timeout {
        secs: u64,
        stdout_tail: String,
        stderr_tail: String,
    },

    #[error("process failed (exit code {code:?})")]
    ProcessFailed {
        code: Option<i32>,
        stdout_tail: String,
        stderr_tail: String,
    },

    #[error("failed to spawn process: {0}")]
    Spawn(String),

    #[error("malformed result: {reason}")]
    MalformedResult { reason: String, raw: Option<String> },

    #[error("remote runner failed: {0}")]
    RemoteFailed(String),

    #[error("run cancelled")]
    Cancelled,

    #[error("result posted for {posted_game} but the active run is {active_game}")]
    ResultMismatch {
        active_game: String,
        posted_game: String,
    },
}

impl RunError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResult {
            reason: reason.into(),
            raw: None,
        }
    }

    pub fn malformed_raw(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedResult {
            reason: reason.into(),
            raw: Some(raw.into()),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            RunError::NotFound(_) => ErrorCode::GameNotFound,
            RunError::AlreadyRunning { .. } => ErrorCode::RunInProgress,
            RunError::NoActiveRun => ErrorCode::NoActiveRun,
            RunError::Timeout { .. } => ErrorCode::RunTimeout,
            RunError::ProcessFailed { .. } | RunError::Spawn(_) => ErrorCode::ProcessFailed,
            RunError::MalformedResult { .. } => ErrorCode::MalformedResult,
            RunError::RemoteFailed(_) => ErrorCode::RemoteFailed,
            RunError::Cancelled => ErrorCode::RunCancelled,
            RunError::ResultMismatch { .. } => ErrorCode::ResultMismatch,
        }
    }

    /// Diagnostic output captured from the game, if any.
    pub fn diagnostics(&self) -> Option<serde_json::Value> {
        match self {
            RunError::Timeout {
                stdout_tail,
                stderr_tail,
                ..
            } => Some(serde_json::json!({ "stdout": stdout_tail, "stderr": stderr_tail })),
            RunError::ProcessFailed {
                code,
                stdout_tail,
                stderr_tail,
            } => Some(serde_json::json!({
                "returncode": code,
                "stdout": stdout_tail,
                "stderr": stderr_tail,
            })),
            RunError::MalformedResult { raw: Some(raw), .. } => {
                Some(serde_json::json!({ "raw": raw }))
            }
            _ => None,
        }
    }
}
