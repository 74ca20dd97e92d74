use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::adapters::{AdapterOutcome, ExecutionAdapter, RunContext};
use crate::domain::RawResult;
use crate::errors::RunError;
use crate::manifest::ExecutionMode;

/// Slack on top of the run budget for the runner's own bookkeeping.
const TRANSPORT_SLACK: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    entry: &'a str,
    players: u8,
    seed: u64,
}

/// Delegates execution to the sandboxed runner service.
pub struct RemoteAdapter {
    client: reqwest::Client,
    runner_url: String,
}

impl RemoteAdapter {
    pub fn new(runner_url: impl Into<String>, run_timeout: Duration) -> Result<Self, RunError> {
        let client = reqwest::Client::builder()
            .timeout(run_timeout + TRANSPORT_SLACK)
            .build()
            .map_err(|e| RunError::RemoteFailed(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(client, runner_url))
    }

    pub fn with_client(client: reqwest::Client, runner_url: impl Into<String>) -> Self {
        Self {
            client,
            runner_url: runner_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn call(&self, ctx: &RunContext) -> Result<RawResult, RunError> {
        let url = format!("{}/run", self.runner_url);
        let payload = RunRequest {
            entry: &ctx.game.entry_path,
            players: ctx.game.player_count,
            seed: ctx.seed,
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RunError::RemoteFailed(format!("runner request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RunError::RemoteFailed(format!("failed to read runner response: {e}")))?;
        let parsed: Option<Value> = serde_json::from_str(&body).ok();

        let ok = parsed
            .as_ref()
            .and_then(|v| v.get("ok"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !status.is_success() || !ok {
            let reason = parsed
                .as_ref()
                .and_then(|v| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("runner returned {status}: {body}"));
            return Err(RunError::RemoteFailed(reason));
        }

        match parsed.as_ref().and_then(|v| v.get("result")) {
            Some(result) => RawResult::from_json(result),
            None => Err(RunError::malformed_raw("runner response has no result", body)),
        }
    }
}

#[async_trait]
impl ExecutionAdapter for RemoteAdapter {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Remote
    }

    async fn execute(&self, ctx: RunContext) -> Result<AdapterOutcome, RunError> {
        info!(run_id = %ctx.run_id, game_id = %ctx.game.id, runner = %self.runner_url, "delegating run");
        tokio::select! {
            res = self.call(&ctx) => {
                if let Err(err) = &res {
                    warn!(run_id = %ctx.run_id, error = %err, "remote run failed");
                }
                res.map(AdapterOutcome::Completed)
            }
            _ = ctx.cancel.cancelled() => Err(RunError::Cancelled),
        }
    }
}
