//! Party host test support utilities
//!
//! Shared helpers for integration tests: currently the unified logging
//! bootstrap so every test binary emits logs the same way.

pub mod logging;
