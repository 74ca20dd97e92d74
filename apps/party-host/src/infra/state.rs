use std::sync::Arc;

use tracing::info;

use crate::adapters::{
    BrowserAdapter, ControlChannel, ExecutionAdapter, RemoteAdapter, SubprocessAdapter,
};
use crate::config::HostConfig;
use crate::error::AppError;
use crate::manifest::ManifestRegistry;
use crate::services::{ControllerRegistry, Dispatcher};
use crate::state::AppState;
use crate::ws::BroadcastHub;

/// Builder for creating AppState instances (used in both tests and main)
#[derive(Default)]
pub struct StateBuilder {
    config: Option<HostConfig>,
    adapters: Vec<Arc<dyn ExecutionAdapter>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: HostConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default adapter for the adapter's mode.
    pub fn with_adapter(mut self, adapter: Arc<dyn ExecutionAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Wires the hub, registries and adapters. Without an explicit config the
    /// environment is read.
    pub fn build(self) -> Result<AppState, AppError> {
        let config = match self.config {
            Some(config) => config,
            None => HostConfig::from_env()?,
        };

        let hub = Arc::new(BroadcastHub::new());
        let controllers = Arc::new(ControllerRegistry::new());
        let controls = Arc::new(ControlChannel::new(&config.control_file));

        let remote = RemoteAdapter::new(&config.runner_url, config.run_timeout)
            .map_err(|e| AppError::config(e.to_string()))?;

        let mut dispatcher = Dispatcher::new(
            ManifestRegistry::new(&config.minigames_dir),
            hub.clone(),
            controllers.clone(),
            controls,
            config.browser_result_timeout,
        )
        .with_adapter(Arc::new(SubprocessAdapter::new(
            &config.repo_root,
            config.run_timeout,
            &config.control_file,
        )))
        .with_adapter(Arc::new(remote))
        .with_adapter(Arc::new(BrowserAdapter::new(hub.clone())));

        for adapter in self.adapters {
            dispatcher = dispatcher.with_adapter(adapter);
        }

        info!(
            games_dir = %config.minigames_dir.display(),
            runner_url = %config.runner_url,
            "party host state built"
        );

        Ok(AppState::new(config, Arc::new(dispatcher), controllers, hub))
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
