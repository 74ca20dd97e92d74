//! Live event fabric: the broadcast hub and the WebSocket sessions of
//! display clients and phone controllers.

pub mod controller;
pub mod display;
pub mod hub;
pub mod protocol;

pub use hub::{BroadcastHub, EventSink, Frame};
pub use protocol::{ClientMsg, ServerMsg};
