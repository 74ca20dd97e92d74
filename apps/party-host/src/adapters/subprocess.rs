use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::adapters::{AdapterOutcome, ExecutionAdapter, RunContext};
use crate::domain::outcome::parse_sentinel_line;
use crate::domain::RawResult;
use crate::errors::RunError;
use crate::manifest::{ExecutionMode, GameDescriptor};

/// Bytes of stdout/stderr kept for diagnostics.
pub const TAIL_BYTES: usize = 4000;

/// Runs a game as a local child process and scans its stdout for the
/// `RESULT:` sentinel line.
pub struct SubprocessAdapter {
    repo_root: PathBuf,
    timeout: Duration,
    control_file: PathBuf,
}

impl SubprocessAdapter {
    pub fn new(repo_root: impl Into<PathBuf>, timeout: Duration, control_file: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            timeout,
            control_file: control_file.into(),
        }
    }

    fn resolve_entry(&self, game: &GameDescriptor) -> Result<PathBuf, RunError> {
        let entry = std::path::absolute(self.repo_root.join(&game.entry_path))
            .map_err(|e| RunError::Spawn(format!("bad entry path {}: {e}", game.entry_path)))?;
        if !entry.is_file() {
            return Err(RunError::Spawn(format!(
                "entry not found: {}",
                entry.display()
            )));
        }
        Ok(entry)
    }
}

/// Interpreter and leading arguments for an entry file.
pub(crate) fn launcher_for(entry: &Path) -> (OsString, Vec<OsString>) {
    let ext = entry
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let interpreter = match ext.as_deref() {
        Some("js" | "mjs" | "cjs") => Some("node"),
        Some("py") => Some("python3"),
        Some("sh") => Some("sh"),
        _ => None,
    };
    match interpreter {
        Some(program) => (program.into(), vec![entry.as_os_str().to_owned()]),
        None => (entry.as_os_str().to_owned(), Vec::new()),
    }
}

/// Rolling window over the last `TAIL_BYTES` of a stream.
#[derive(Debug, Default)]
struct Tail {
    buf: Vec<u8>,
}

impl Tail {
    fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > TAIL_BYTES {
            let excess = self.buf.len() - TAIL_BYTES;
            self.buf.drain(..excess);
        }
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

type SharedTail = Arc<Mutex<Tail>>;

type Sentinel = Option<Result<RawResult, RunError>>;

enum Waited {
    Exited(Sentinel, io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Reads stdout to EOF; the first sentinel line wins, later ones are ignored.
async fn scan_stdout<R: AsyncRead + Unpin>(stream: R, tail: SharedTail) -> Sentinel {
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();
    let mut found = None;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                tail.lock().push(&line);
                if found.is_none() {
                    found = parse_sentinel_line(&String::from_utf8_lossy(&line));
                }
            }
            Err(err) => {
                warn!(error = %err, "stdout read failed");
                break;
            }
        }
    }
    found
}

async fn drain<R: AsyncRead + Unpin>(mut stream: R, tail: SharedTail) {
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => tail.lock().push(&chunk[..n]),
            Err(err) => {
                warn!(error = %err, "stderr read failed");
                break;
            }
        }
    }
}

async fn kill(child: &mut Child) {
    if let Err(err) = child.kill().await {
        warn!(error = %err, "failed to kill game process");
    }
}

#[async_trait]
impl ExecutionAdapter for SubprocessAdapter {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Subprocess
    }

    async fn execute(&self, ctx: RunContext) -> Result<AdapterOutcome, RunError> {
        let entry = self.resolve_entry(&ctx.game)?;
        let (program, leading) = launcher_for(&entry);
        let workdir = entry
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.repo_root.clone());

        let mut child = Command::new(&program)
            .args(&leading)
            .arg("--players")
            .arg(ctx.game.player_count.to_string())
            .arg("--seed")
            .arg(ctx.seed.to_string())
            .args(["--mode", "jam"])
            .current_dir(&workdir)
            .env("CONTROL_FILE", &self.control_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunError::Spawn(format!("{}: {e}", program.to_string_lossy())))?;

        info!(
            run_id = %ctx.run_id,
            game_id = %ctx.game.id,
            pid = ?child.id(),
            "game process spawned"
        );

        let stdout_tail = SharedTail::default();
        let stderr_tail = SharedTail::default();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let waited = {
            let collect = async {
                let scan = async {
                    match stdout {
                        Some(s) => scan_stdout(s, stdout_tail.clone()).await,
                        None => None,
                    }
                };
                let drain_err = async {
                    if let Some(s) = stderr {
                        drain(s, stderr_tail.clone()).await;
                    }
                };
                let (sentinel, ()) = tokio::join!(scan, drain_err);
                (sentinel, child.wait().await)
            };

            tokio::select! {
                res = tokio::time::timeout(self.timeout, collect) => match res {
                    Ok((sentinel, status)) => Waited::Exited(sentinel, status),
                    Err(_) => Waited::TimedOut,
                },
                _ = ctx.cancel.cancelled() => Waited::Cancelled,
            }
        };

        let stdout_text = stdout_tail.lock().text();
        let stderr_text = stderr_tail.lock().text();

        match waited {
            Waited::TimedOut => {
                kill(&mut child).await;
                warn!(
                    run_id = %ctx.run_id,
                    game_id = %ctx.game.id,
                    timeout_secs = self.timeout.as_secs(),
                    "game process timed out"
                );
                Err(RunError::Timeout {
                    secs: self.timeout.as_secs(),
                    stdout_tail: stdout_text,
                    stderr_tail: stderr_text,
                })
            }
            Waited::Cancelled => {
                kill(&mut child).await;
                info!(run_id = %ctx.run_id, "game process killed on cancel");
                Err(RunError::Cancelled)
            }
            Waited::Exited(sentinel, status) => {
                let status = status.map_err(|e| RunError::Spawn(format!("wait failed: {e}")))?;
                if !status.success() {
                    return Err(RunError::ProcessFailed {
                        code: status.code(),
                        stdout_tail: stdout_text,
                        stderr_tail: stderr_text,
                    });
                }
                match sentinel {
                    Some(Ok(raw)) => Ok(AdapterOutcome::Completed(raw)),
                    Some(Err(err)) => Err(err),
                    None => Err(RunError::malformed_raw(
                        "missing RESULT line in stdout",
                        stdout_text,
                    )),
                }
            }
        }
    }
}
