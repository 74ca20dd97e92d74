//! Error handling for the party host.

pub mod error_code;
pub mod run;

pub use error_code::ErrorCode;
pub use run::RunError;
