pub mod controllers;
pub mod dispatcher;

pub use controllers::{
    ControlOutcome, ControlTarget, ControllerError, ControllerRegistry, RemappedControl,
};
pub use dispatcher::{Dispatcher, RunOutcome, RunPhase};
