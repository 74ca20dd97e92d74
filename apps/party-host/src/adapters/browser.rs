use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::adapters::{AdapterOutcome, ExecutionAdapter, RunContext};
use crate::errors::RunError;
use crate::manifest::ExecutionMode;
use crate::ws::protocol::{GameStarted, ServerMsg};
use crate::ws::BroadcastHub;

/// Hands the game to the display clients. The result arrives later through
/// the browser result path, so execution always ends `Pending`.
pub struct BrowserAdapter {
    hub: Arc<BroadcastHub>,
}

impl BrowserAdapter {
    pub fn new(hub: Arc<BroadcastHub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl ExecutionAdapter for BrowserAdapter {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Browser
    }

    async fn execute(&self, ctx: RunContext) -> Result<AdapterOutcome, RunError> {
        let displays = self.hub.display_count();
        info!(run_id = %ctx.run_id, game_id = %ctx.game.id, displays, "loading browser game");
        self.hub.broadcast_displays(&ServerMsg::LoadGame {
            payload: GameStarted {
                run_id: ctx.run_id,
                mode: ExecutionMode::Browser,
                game: ctx.game,
            },
        });
        Ok(AdapterOutcome::Pending)
    }
}
