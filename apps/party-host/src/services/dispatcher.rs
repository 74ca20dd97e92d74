//! Run lifecycle and session ownership.
//!
//! At most one run is active. The active-run slot and the session state sit
//! behind synchronous locks that are never held across an `.await`, so the
//! busy check and the claim of the slot are one atomic step, and settlement
//! (prize calculation, apply, snapshot) cannot interleave with a reset.
//!
//! Lock order: `active` before `session`.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::{AdapterOutcome, ControlChannel, ExecutionAdapter, RunContext};
use crate::domain::{
    calculate_prizes, BrowserResult, ControlScheme, PrizeResult, RawResult, RunRecord,
    SessionState,
};
use crate::errors::RunError;
use crate::manifest::{ExecutionMode, GameDescriptor, ManifestRegistry};
use crate::services::controllers::{ControlTarget, ControllerRegistry, RemappedControl};
use crate::ws::protocol::{
    ActiveRunView, GameEnded, GameStarted, PrizesAwarded, RunEnd, ServerMsg, SessionSnapshot,
};
use crate::ws::BroadcastHub;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Starting,
    Running,
    Collecting,
    Settled,
    Failed,
}

struct ActiveRun {
    run_id: Uuid,
    game: GameDescriptor,
    scheme: ControlScheme,
    phase: RunPhase,
    started_at: OffsetDateTime,
    cancel: CancellationToken,
}

impl ActiveRun {
    fn view(&self) -> ActiveRunView {
        ActiveRunView {
            run_id: self.run_id,
            game_id: self.game.id.clone(),
            mode: self.game.execution_mode,
            phase: self.phase,
            started_at: self.started_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledRun {
    pub run_id: Uuid,
    pub game: GameDescriptor,
    pub result: RawResult,
    pub prizes: PrizeResult,
    pub state: SessionState,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Settled(SettledRun),
    /// Browser game loaded; the result arrives later.
    Pending { run_id: Uuid, game: GameDescriptor },
}

pub struct Dispatcher {
    registry: ManifestRegistry,
    adapters: HashMap<ExecutionMode, Arc<dyn ExecutionAdapter>>,
    hub: Arc<BroadcastHub>,
    controllers: Arc<ControllerRegistry>,
    controls: Arc<ControlChannel>,
    browser_result_timeout: Option<Duration>,
    active: Mutex<Option<ActiveRun>>,
    session: Mutex<SessionState>,
}

impl Dispatcher {
    pub fn new(
        registry: ManifestRegistry,
        hub: Arc<BroadcastHub>,
        controllers: Arc<ControllerRegistry>,
        controls: Arc<ControlChannel>,
        browser_result_timeout: Option<Duration>,
    ) -> Self {
        Self {
            registry,
            adapters: HashMap::new(),
            hub,
            controllers,
            controls,
            browser_result_timeout,
            active: Mutex::new(None),
            session: Mutex::new(SessionState::default()),
        }
    }

    /// Installs the adapter for its mode, replacing any previous one.
    pub fn with_adapter(mut self, adapter: Arc<dyn ExecutionAdapter>) -> Self {
        self.adapters.insert(adapter.mode(), adapter);
        self
    }

    pub fn registry(&self) -> &ManifestRegistry {
        &self.registry
    }

    pub fn active_run(&self) -> Option<ActiveRunView> {
        self.active.lock().as_ref().map(ActiveRun::view)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let active_run = self.active_run();
        let state = self.session.lock().clone();
        SessionSnapshot {
            state,
            active_run,
            taken_players: self.controllers.taken_players(),
        }
    }

    /// Buttons a phone should show: the running game's, or the default set.
    pub fn control_hints(&self) -> Vec<String> {
        self.active_scheme().unwrap_or_default().hints()
    }

    /// Runs `game_id` to settlement, or to `Pending` for browser games.
    ///
    /// Session state is only touched after a valid result; every failure
    /// leaves it exactly as it was. Dropping the returned future does not
    /// abandon the run: it still settles or fails on its own task.
    pub async fn run(self: &Arc<Self>, game_id: &str) -> Result<RunOutcome, RunError> {
        let game = self
            .registry
            .find(game_id)
            .ok_or_else(|| RunError::NotFound(game_id.to_string()))?;
        let adapter = self
            .adapters
            .get(&game.execution_mode)
            .cloned()
            .ok_or_else(|| {
                RunError::Spawn(format!("no adapter for {} games", game.execution_mode))
            })?;

        let ctx = self.begin(&game)?;
        let run_id = ctx.run_id;
        let cancel = ctx.cancel.clone();

        self.clear_controls();
        self.set_phase(run_id, RunPhase::Running);
        self.hub.broadcast(&ServerMsg::GameStarted {
            payload: GameStarted {
                run_id,
                mode: game.execution_mode,
                game: game.clone(),
            },
        });
        self.broadcast_state();

        // Must reach a terminal phase even if the caller goes away.
        let dispatcher = Arc::clone(self);
        let driver =
            tokio::spawn(async move { dispatcher.drive(run_id, game, adapter, ctx, cancel).await });

        match driver.await {
            Ok(outcome) => outcome,
            Err(err) => {
                let reason = format!("run task failed: {err}");
                self.clear_controls();
                self.abandon(run_id, RunEnd::Failed, Some(reason.clone()));
                Err(RunError::Spawn(reason))
            }
        }
    }

    async fn drive(
        self: Arc<Self>,
        run_id: Uuid,
        game: GameDescriptor,
        adapter: Arc<dyn ExecutionAdapter>,
        ctx: RunContext,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, RunError> {
        match adapter.execute(ctx).await {
            Ok(AdapterOutcome::Completed(raw)) => {
                self.clear_controls();
                self.settle(run_id, raw).map(RunOutcome::Settled)
            }
            Ok(AdapterOutcome::Pending) => {
                self.spawn_watchdog(run_id, cancel);
                Ok(RunOutcome::Pending { run_id, game })
            }
            Err(err) => {
                self.clear_controls();
                self.abandon(run_id, RunEnd::Failed, Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Settles the pending browser run with a posted result.
    ///
    /// A payload that fails validation abandons the run. A payload naming a
    /// different game is rejected and the run keeps waiting.
    pub fn submit_browser_result(&self, payload: &Value) -> Result<SettledRun, RunError> {
        let (run_id, active_game) = {
            let active = self.active.lock();
            match active.as_ref() {
                Some(run)
                    if run.game.execution_mode == ExecutionMode::Browser
                        && run.phase == RunPhase::Running =>
                {
                    (run.run_id, run.game.id.clone())
                }
                _ => return Err(RunError::NoActiveRun),
            }
        };

        let posted = match BrowserResult::from_json(payload) {
            Ok(posted) => posted,
            Err(err) => {
                self.abandon(run_id, RunEnd::Failed, Some(err.to_string()));
                return Err(err);
            }
        };

        if let Some(posted_game) = posted.game_id {
            if posted_game != active_game {
                warn!(run_id = %run_id, active_game, posted_game, "result for wrong game");
                return Err(RunError::ResultMismatch {
                    active_game,
                    posted_game,
                });
            }
        }

        self.settle(run_id, posted.result)
    }

    /// Abandons the active run without touching the session.
    pub fn cancel_active(&self) -> Result<Uuid, RunError> {
        let run = self.active.lock().take().ok_or(RunError::NoActiveRun)?;
        let run_id = run.run_id;
        self.clear_controls();
        self.finish_abandoned(run, RunEnd::Cancelled, None);
        Ok(run_id)
    }

    /// Cancels any active run and zeroes the session. Player names survive.
    pub fn reset(&self) -> SessionSnapshot {
        let aborted = {
            let mut active = self.active.lock();
            let run = active.take();
            self.session.lock().reset();
            run
        };
        info!(aborted_run = aborted.is_some(), "session reset");

        if let Some(run) = aborted {
            self.finish_abandoned(run, RunEnd::Cancelled, Some("session reset".to_string()));
        } else {
            self.broadcast_state();
        }
        self.clear_controls();
        self.snapshot()
    }

    fn begin(&self, game: &GameDescriptor) -> Result<RunContext, RunError> {
        let mut active = self.active.lock();
        if let Some(run) = active.as_ref() {
            return Err(RunError::AlreadyRunning {
                active_game: run.game.id.clone(),
            });
        }

        let ctx = RunContext {
            run_id: Uuid::new_v4(),
            game: game.clone(),
            seed: u64::from(rand::random::<u32>()),
            cancel: CancellationToken::new(),
        };
        *active = Some(ActiveRun {
            run_id: ctx.run_id,
            game: game.clone(),
            scheme: game.control_scheme(),
            phase: RunPhase::Starting,
            started_at: OffsetDateTime::now_utc(),
            cancel: ctx.cancel.clone(),
        });

        info!(
            run_id = %ctx.run_id,
            game_id = %game.id,
            mode = %game.execution_mode,
            seed = ctx.seed,
            phase = "starting",
            "run claimed"
        );
        Ok(ctx)
    }

    fn set_phase(&self, run_id: Uuid, phase: RunPhase) {
        if let Some(run) = self.active.lock().as_mut().filter(|r| r.run_id == run_id) {
            run.phase = phase;
        }
    }

    /// Applies a valid result. Fails with `Cancelled` if the run was
    /// abandoned while its result was in flight.
    fn settle(&self, run_id: Uuid, raw: RawResult) -> Result<SettledRun, RunError> {
        let (run, prizes, state) = {
            let mut active = self.active.lock();
            if active.as_ref().map(|r| r.run_id) != Some(run_id) {
                info!(run_id = %run_id, "discarding result of abandoned run");
                return Err(RunError::Cancelled);
            }
            let Some(mut run) = active.take() else {
                return Err(RunError::Cancelled);
            };
            run.phase = RunPhase::Collecting;

            let prizes = calculate_prizes(&raw.scores, raw.winner);
            let record = RunRecord::new(run.game.id.clone(), raw.scores, prizes.clone());
            let mut session = self.session.lock();
            session.apply_result(record);
            run.phase = RunPhase::Settled;
            (run, prizes, session.clone())
        };
        run.cancel.cancel();

        info!(
            run_id = %run_id,
            game_id = %run.game.id,
            winner = prizes.winner_index,
            phase = "settled",
            "run settled"
        );

        self.hub.broadcast(&ServerMsg::GameEnded {
            payload: GameEnded {
                run_id,
                game_id: run.game.id.clone(),
                outcome: RunEnd::Settled,
                error: None,
            },
        });
        self.hub.broadcast(&ServerMsg::PrizesAwarded {
            payload: PrizesAwarded {
                run_id,
                game_id: run.game.id.clone(),
                prizes: prizes.clone(),
                coins: state.coins,
                stars: state.stars,
            },
        });
        self.broadcast_state();

        Ok(SettledRun {
            run_id,
            game: run.game,
            result: raw,
            prizes,
            state,
        })
    }

    /// Drops the run if it is still the active one. Returns whether it was.
    fn abandon(&self, run_id: Uuid, outcome: RunEnd, error: Option<String>) -> bool {
        let run = {
            let mut active = self.active.lock();
            if active.as_ref().map(|r| r.run_id) != Some(run_id) {
                return false;
            }
            active.take()
        };
        match run {
            Some(run) => {
                self.finish_abandoned(run, outcome, error);
                true
            }
            None => false,
        }
    }

    fn finish_abandoned(&self, mut run: ActiveRun, outcome: RunEnd, error: Option<String>) {
        run.cancel.cancel();
        run.phase = RunPhase::Failed;
        warn!(
            run_id = %run.run_id,
            game_id = %run.game.id,
            outcome = ?outcome,
            error = error.as_deref().unwrap_or(""),
            phase = "failed",
            "run abandoned"
        );
        self.hub.broadcast(&ServerMsg::GameEnded {
            payload: GameEnded {
                run_id: run.run_id,
                game_id: run.game.id,
                outcome,
                error,
            },
        });
        self.broadcast_state();
    }

    fn spawn_watchdog(self: &Arc<Self>, run_id: Uuid, cancel: CancellationToken) {
        let Some(limit) = self.browser_result_timeout else {
            return;
        };
        let dispatcher: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(limit) => {
                    if let Some(dispatcher) = dispatcher.upgrade() {
                        dispatcher.abandon(
                            run_id,
                            RunEnd::TimedOut,
                            Some(format!("no result within {}s", limit.as_secs())),
                        );
                    }
                }
                _ = cancel.cancelled() => {}
            }
        });
    }

    fn broadcast_state(&self) {
        self.hub.broadcast(&ServerMsg::State {
            payload: self.snapshot(),
        });
    }

    fn clear_controls(&self) {
        if let Err(err) = self.controls.clear() {
            warn!(path = %self.controls.path().display(), error = %err, "failed to clear control file");
        }
    }
}

impl ControlTarget for Dispatcher {
    fn active_scheme(&self) -> Option<ControlScheme> {
        self.active
            .lock()
            .as_ref()
            .filter(|r| r.phase == RunPhase::Running)
            .map(|r| r.scheme.clone())
    }

    fn forward(&self, control: RemappedControl) {
        let mode = self
            .active
            .lock()
            .as_ref()
            .filter(|r| r.phase == RunPhase::Running)
            .map(|r| r.game.execution_mode);

        match mode {
            Some(ExecutionMode::Subprocess | ExecutionMode::Remote) => {
                if let Err(err) = self
                    .controls
                    .set(control.player, &control.button, control.pressed)
                {
                    warn!(error = %err, "failed to write control file");
                }
            }
            Some(ExecutionMode::Browser) => {
                self.hub.broadcast_displays(&ServerMsg::MobileControl {
                    player: control.player,
                    button: control.button,
                    pressed: control.pressed,
                });
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use tokio::sync::Notify;

    use super::*;
    use crate::adapters::BrowserAdapter;
    use crate::ws::Frame;

    /// Answers every run with a fixed outcome, optionally after a gate opens.
    struct Scripted {
        mode: ExecutionMode,
        answer: Result<AdapterOutcome, RunError>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl ExecutionAdapter for Scripted {
        fn mode(&self) -> ExecutionMode {
            self.mode
        }

        async fn execute(&self, ctx: RunContext) -> Result<AdapterOutcome, RunError> {
            if let Some(gate) = &self.gate {
                tokio::select! {
                    _ = gate.notified() => {}
                    _ = ctx.cancel.cancelled() => return Err(RunError::Cancelled),
                }
            }
            self.answer.clone()
        }
    }

    fn write_manifest(root: &Path, id: &str, kind: &str) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("manifest.json"),
            json!({"id": id, "name": id, "type": kind, "entry": "main"}).to_string(),
        )
        .unwrap();
    }

    struct Harness {
        _dir: TempDir,
        dispatcher: Arc<Dispatcher>,
        events: UnboundedReceiver<Frame>,
    }

    impl Harness {
        fn new(adapters: Vec<Arc<dyn ExecutionAdapter>>, browser_timeout: Option<Duration>) -> Self {
            let dir = tempfile::tempdir().unwrap();
            write_manifest(dir.path(), "mg-duck-attack", "subprocess");
            write_manifest(dir.path(), "mg-bubbles", "browser");

            let hub = Arc::new(BroadcastHub::new());
            let (tx, events) = unbounded_channel();
            hub.register_display(Uuid::new_v4(), Arc::new(tx));

            let mut dispatcher = Dispatcher::new(
                ManifestRegistry::new(dir.path()),
                hub.clone(),
                Arc::new(ControllerRegistry::new()),
                Arc::new(ControlChannel::new(dir.path().join("controls.json"))),
                browser_timeout,
            )
            .with_adapter(Arc::new(BrowserAdapter::new(hub)));
            for adapter in adapters {
                dispatcher = dispatcher.with_adapter(adapter);
            }

            Self {
                _dir: dir,
                dispatcher: Arc::new(dispatcher),
                events,
            }
        }

        fn drain_types(&mut self) -> Vec<String> {
            let mut kinds = Vec::new();
            while let Ok(frame) = self.events.try_recv() {
                let value: Value = serde_json::from_str(&frame.0).unwrap();
                kinds.push(value["type"].as_str().unwrap().to_string());
            }
            kinds
        }
    }

    fn completed(scores: [u64; 4], winner: Option<usize>) -> Arc<dyn ExecutionAdapter> {
        Arc::new(Scripted {
            mode: ExecutionMode::Subprocess,
            answer: Ok(AdapterOutcome::Completed(RawResult::new(scores, winner))),
            gate: None,
        })
    }

    #[tokio::test]
    async fn settles_and_broadcasts_in_order() {
        let mut h = Harness::new(vec![completed([30, 10, 0, 0], Some(0))], None);

        let outcome = h.dispatcher.run("mg-duck-attack").await.unwrap();
        let RunOutcome::Settled(settled) = outcome else {
            panic!("expected settlement");
        };
        assert_eq!(settled.prizes.breakdown[0].coins, 10);
        assert_eq!(settled.state.coins, [10, 5, 3, 3]);
        assert!(h.dispatcher.active_run().is_none());

        assert_eq!(
            h.drain_types(),
            vec!["GAME_STARTED", "STATE", "GAME_ENDED", "PRIZES_AWARDED", "STATE"]
        );
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let h = Harness::new(vec![completed([0; 4], None)], None);
        assert_eq!(
            h.dispatcher.run("mg-nope").await.unwrap_err(),
            RunError::NotFound("mg-nope".into())
        );
    }

    #[tokio::test]
    async fn failure_leaves_session_untouched() {
        let failing: Arc<dyn ExecutionAdapter> = Arc::new(Scripted {
            mode: ExecutionMode::Subprocess,
            answer: Err(RunError::malformed("missing RESULT line in stdout")),
            gate: None,
        });
        let mut h = Harness::new(vec![failing], None);
        let before = h.dispatcher.snapshot().state;

        let err = h.dispatcher.run("mg-duck-attack").await.unwrap_err();
        assert!(matches!(err, RunError::MalformedResult { .. }));
        assert_eq!(h.dispatcher.snapshot().state, before);
        assert!(h.dispatcher.active_run().is_none());
        assert!(h.drain_types().contains(&"GAME_ENDED".to_string()));
    }

    #[tokio::test]
    async fn concurrent_run_is_rejected_then_cancel_frees_slot() {
        let gate = Arc::new(Notify::new());
        let slow: Arc<dyn ExecutionAdapter> = Arc::new(Scripted {
            mode: ExecutionMode::Subprocess,
            answer: Ok(AdapterOutcome::Completed(RawResult::new([1, 0, 0, 0], None))),
            gate: Some(gate.clone()),
        });
        let h = Harness::new(vec![slow], None);

        let first = {
            let dispatcher = h.dispatcher.clone();
            tokio::spawn(async move { dispatcher.run("mg-duck-attack").await })
        };
        while h.dispatcher.active_run().is_none() {
            tokio::task::yield_now().await;
        }

        let busy = h.dispatcher.run("mg-bubbles").await.unwrap_err();
        assert_eq!(
            busy,
            RunError::AlreadyRunning {
                active_game: "mg-duck-attack".into()
            }
        );

        h.dispatcher.cancel_active().unwrap();
        assert_eq!(first.await.unwrap().unwrap_err(), RunError::Cancelled);
        assert_eq!(h.dispatcher.snapshot().state.coins, [0; 4]);
        assert_eq!(h.dispatcher.cancel_active(), Err(RunError::NoActiveRun));
    }

    #[tokio::test]
    async fn dropped_caller_still_settles_and_frees_slot() {
        let gate = Arc::new(Notify::new());
        let slow: Arc<dyn ExecutionAdapter> = Arc::new(Scripted {
            mode: ExecutionMode::Subprocess,
            answer: Ok(AdapterOutcome::Completed(RawResult::new([0, 7, 0, 0], None))),
            gate: Some(gate.clone()),
        });
        let mut h = Harness::new(vec![slow], None);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), h.dispatcher.run("mg-duck-attack"))
                .await;
        assert!(abandoned.is_err(), "gated run cannot finish in time");
        assert_eq!(
            h.dispatcher.active_run().map(|r| r.game_id),
            Some("mg-duck-attack".to_string())
        );

        gate.notify_one();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while h.dispatcher.active_run().is_some() {
            assert!(tokio::time::Instant::now() < deadline, "run never settled");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(h.dispatcher.snapshot().state.coins, [5, 10, 5, 5]);
        let kinds = h.drain_types();
        assert!(kinds.contains(&"PRIZES_AWARDED".to_string()));
        h.dispatcher.run("mg-bubbles").await.unwrap();
    }

    #[tokio::test]
    async fn browser_run_settles_from_posted_result() {
        let h = Harness::new(vec![], None);

        let outcome = h.dispatcher.run("mg-bubbles").await.unwrap();
        assert!(matches!(outcome, RunOutcome::Pending { .. }));
        assert_eq!(h.dispatcher.active_run().unwrap().phase, RunPhase::Running);

        let mismatch = h
            .dispatcher
            .submit_browser_result(&json!({"gameId": "mg-other", "scores": [1, 2, 3, 4]}))
            .unwrap_err();
        assert!(matches!(mismatch, RunError::ResultMismatch { .. }));
        assert!(h.dispatcher.active_run().is_some(), "mismatch keeps waiting");

        let settled = h
            .dispatcher
            .submit_browser_result(&json!({"gameId": "mg-bubbles", "scores": [5, 50, 0, 0]}))
            .unwrap();
        assert_eq!(settled.prizes.rankings, [2, 1, 3, 3]);
        assert_eq!(
            h.dispatcher.submit_browser_result(&json!({"scores": [0, 0, 0, 0]})),
            Err(RunError::NoActiveRun)
        );
    }

    #[tokio::test]
    async fn malformed_browser_result_abandons_run() {
        let h = Harness::new(vec![], None);
        h.dispatcher.run("mg-bubbles").await.unwrap();

        let err = h
            .dispatcher
            .submit_browser_result(&json!({"scores": [1, 2]}))
            .unwrap_err();
        assert!(matches!(err, RunError::MalformedResult { .. }));
        assert!(h.dispatcher.active_run().is_none());
    }

    #[tokio::test]
    async fn browser_watchdog_abandons_without_settling() {
        let mut h = Harness::new(vec![], Some(Duration::from_millis(50)));
        h.dispatcher.run("mg-bubbles").await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(h.dispatcher.active_run().is_none());
        assert_eq!(h.dispatcher.snapshot().state.coins, [0; 4]);
        let frames = h.drain_types();
        assert!(frames.contains(&"GAME_ENDED".to_string()));
        assert!(!frames.contains(&"PRIZES_AWARDED".to_string()));
    }

    #[tokio::test]
    async fn reset_zeroes_and_cancels_active_run() {
        let h = Harness::new(vec![completed([30, 10, 0, 0], None)], None);
        h.dispatcher.run("mg-duck-attack").await.unwrap();
        h.dispatcher.run("mg-bubbles").await.unwrap();

        let snapshot = h.dispatcher.reset();
        assert_eq!(snapshot.state.coins, [0; 4]);
        assert!(snapshot.state.prize_history.is_empty());
        assert!(snapshot.active_run.is_none());
        assert_eq!(snapshot.state.player_names[3], "P4");
    }

    #[tokio::test]
    async fn controls_route_by_mode() {
        let mut h = Harness::new(vec![], None);
        assert!(h.dispatcher.active_scheme().is_none());

        h.dispatcher.run("mg-bubbles").await.unwrap();
        h.drain_types();
        h.dispatcher.forward(RemappedControl {
            player: 1,
            button: "up".into(),
            pressed: true,
        });
        assert_eq!(h.drain_types(), vec!["MOBILE_CONTROL"]);
        assert_eq!(h.dispatcher.control_hints(), crate::domain::controls::DEFAULT_BUTTONS);
    }
}
