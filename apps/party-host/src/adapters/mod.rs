//! Execution adapters: one per `ExecutionMode`.
//!
//! The dispatcher owns run lifecycle and session mutation; an adapter only
//! turns a descriptor into a raw result (or reports that the result will
//! arrive later).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::RawResult;
use crate::errors::RunError;
use crate::manifest::{ExecutionMode, GameDescriptor};

pub mod browser;
pub mod control_channel;
pub mod remote;
pub mod subprocess;

pub use browser::BrowserAdapter;
pub use control_channel::ControlChannel;
pub use remote::RemoteAdapter;
pub use subprocess::SubprocessAdapter;

/// Everything an adapter needs to execute one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub game: GameDescriptor,
    pub seed: u64,
    /// Fired when the run is cancelled or reset; adapters must stop promptly.
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdapterOutcome {
    Completed(RawResult),
    /// The result will be posted later through the browser result path.
    Pending,
}

#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    fn mode(&self) -> ExecutionMode;

    async fn execute(&self, ctx: RunContext) -> Result<AdapterOutcome, RunError>;
}
