//! Error codes for the party host API.
//!
//! Every code is SCREAMING_SNAKE_CASE and maps 1:1 to the string that appears
//! in HTTP error bodies and WebSocket `ERROR` frames. Add new codes here; never
//! pass ad-hoc strings as error codes.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request validation
    /// Game id path segment is empty or contains illegal characters
    InvalidGameId,
    /// General bad request error
    BadRequest,

    // Resource not found
    /// No minigame manifest declares this id
    GameNotFound,

    // Run lifecycle
    /// A run is already active
    RunInProgress,
    /// Operation needs an active run but the session is idle
    NoActiveRun,
    /// Subprocess exceeded the wall-clock budget
    RunTimeout,
    /// Subprocess exited non-zero or could not be spawned
    ProcessFailed,
    /// Game output did not match the result grammar
    MalformedResult,
    /// Remote execution service failed or was unreachable
    RemoteFailed,
    /// Run was abandoned by cancel or reset
    RunCancelled,
    /// Browser result names a different game than the active run
    ResultMismatch,

    // Controllers
    /// All four player slots are taken
    SlotFull,
    /// Controller sent CONTROL before JOIN
    NotJoined,

    // System errors
    /// Configuration error
    ConfigError,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidGameId => "INVALID_GAME_ID",
            Self::BadRequest => "BAD_REQUEST",

            Self::GameNotFound => "GAME_NOT_FOUND",

            Self::RunInProgress => "RUN_IN_PROGRESS",
            Self::NoActiveRun => "NO_ACTIVE_RUN",
            Self::RunTimeout => "RUN_TIMEOUT",
            Self::ProcessFailed => "PROCESS_FAILED",
            Self::MalformedResult => "MALFORMED_RESULT",
            Self::RemoteFailed => "REMOTE_FAILED",
            Self::RunCancelled => "RUN_CANCELLED",
            Self::ResultMismatch => "RESULT_GAME_MISMATCH",

            Self::SlotFull => "SLOT_FULL",
            Self::NotJoined => "NOT_JOINED",

            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
