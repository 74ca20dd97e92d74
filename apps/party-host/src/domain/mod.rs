//! Pure session domain: no I/O, no async.

pub mod controls;
pub mod outcome;
pub mod prizes;
pub mod session;

/// Fixed number of player slots in a session.
pub const PLAYERS: usize = 4;

pub use controls::ControlScheme;
pub use outcome::{BrowserResult, RawResult};
pub use prizes::{calculate_prizes, PrizeLine, PrizeResult};
pub use session::{RunRecord, SessionState};
