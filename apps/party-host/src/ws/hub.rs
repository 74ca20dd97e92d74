use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

/// A serialized server frame, shared by every recipient of one broadcast.
#[derive(Message, Clone, Debug)]
#[rtype(result = "()")]
pub struct Frame(pub Arc<str>);

/// Anything that can receive hub frames.
///
/// `deliver` is best-effort and reports whether the frame was queued.
pub trait EventSink: Send + Sync {
    fn deliver(&self, frame: Frame) -> bool;
}

impl EventSink for Recipient<Frame> {
    /// Ignores mailbox capacity; only a stopped actor refuses frames.
    fn deliver(&self, frame: Frame) -> bool {
        if !self.connected() {
            return false;
        }
        self.do_send(frame);
        true
    }
}

impl EventSink for UnboundedSender<Frame> {
    fn deliver(&self, frame: Frame) -> bool {
        self.send(frame).is_ok()
    }
}

/// Fans events out to two independent recipient sets: display clients and
/// controller clients.
#[derive(Default)]
pub struct BroadcastHub {
    displays: DashMap<Uuid, Arc<dyn EventSink>>,
    controllers: DashMap<Uuid, Arc<dyn EventSink>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_display(&self, conn_id: Uuid, sink: Arc<dyn EventSink>) {
        self.displays.insert(conn_id, sink);
    }

    pub fn register_controller(&self, conn_id: Uuid, sink: Arc<dyn EventSink>) {
        self.controllers.insert(conn_id, sink);
    }

    pub fn unregister(&self, conn_id: Uuid) {
        self.displays.remove(&conn_id);
        self.controllers.remove(&conn_id);
    }

    pub fn display_count(&self) -> usize {
        self.displays.len()
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Sends to every display and every controller.
    pub fn broadcast(&self, msg: &ServerMsg) {
        if let Some(frame) = encode(msg) {
            fan_out(&self.displays, &frame);
            fan_out(&self.controllers, &frame);
        }
    }

    pub fn broadcast_displays(&self, msg: &ServerMsg) {
        if let Some(frame) = encode(msg) {
            fan_out(&self.displays, &frame);
        }
    }

    pub fn broadcast_controllers(&self, msg: &ServerMsg) {
        if let Some(frame) = encode(msg) {
            fan_out(&self.controllers, &frame);
        }
    }
}

fn encode(msg: &ServerMsg) -> Option<Frame> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Frame(Arc::from(json))),
        Err(err) => {
            warn!(error = %err, "[HUB] failed to serialize broadcast");
            None
        }
    }
}

fn fan_out(set: &DashMap<Uuid, Arc<dyn EventSink>>, frame: &Frame) {
    for entry in set.iter() {
        if !entry.value().deliver(frame.clone()) {
            debug!(conn_id = %entry.key(), "[HUB] dropped frame for dead recipient");
        }
    }
}
