use std::sync::Arc;

use crate::config::HostConfig;
use crate::services::{ControllerRegistry, Dispatcher};
use crate::ws::BroadcastHub;

/// Shared services handed to every handler and WebSocket session.
#[derive(Clone)]
pub struct AppState {
    config: Arc<HostConfig>,
    dispatcher: Arc<Dispatcher>,
    controllers: Arc<ControllerRegistry>,
    hub: Arc<BroadcastHub>,
}

impl AppState {
    pub fn new(
        config: HostConfig,
        dispatcher: Arc<Dispatcher>,
        controllers: Arc<ControllerRegistry>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
            controllers,
            hub,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn controllers(&self) -> &Arc<ControllerRegistry> {
        &self.controllers
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }
}
