use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RUNNER_URL: &str = "http://runner:5001";
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BROWSER_RESULT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_CONTROL_FILE: &str = "/tmp/pygame_controls.json";

/// Runtime configuration of the party host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub bind_host: String,
    pub port: u16,
    /// Root that manifest `entry` paths are relative to.
    pub repo_root: PathBuf,
    /// Directory scanned for `<folder>/manifest.json`.
    pub minigames_dir: PathBuf,
    /// Base URL of the sandboxed execution service.
    pub runner_url: String,
    /// Wall-clock budget of a subprocess run.
    pub run_timeout: Duration,
    /// How long a browser run may wait for its result; `None` waits forever.
    pub browser_result_timeout: Option<Duration>,
    /// Shared document the control channel writes button states to.
    pub control_file: PathBuf,
    pub cors_allowed_origins: Vec<String>,
}

impl HostConfig {
    /// Builds the configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let repo_root = PathBuf::from(var_or("REPO_ROOT", "/repo"));
        let minigames_dir = env::var("MINIGAMES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| repo_root.join("minigames"));

        let run_secs = parse_var("RUN_TIMEOUT_SECS", DEFAULT_RUN_TIMEOUT_SECS)?;
        let browser_secs = parse_var(
            "BROWSER_RESULT_TIMEOUT_SECS",
            DEFAULT_BROWSER_RESULT_TIMEOUT_SECS,
        )?;
        let origins = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

        Ok(Self {
            bind_host: var_or("HOST_BIND", "0.0.0.0"),
            port: parse_var("HOST_PORT", DEFAULT_PORT)?,
            repo_root,
            minigames_dir,
            runner_url: var_or("RUNNER_URL", DEFAULT_RUNNER_URL),
            run_timeout: Duration::from_secs(run_secs),
            browser_result_timeout: (browser_secs > 0).then(|| Duration::from_secs(browser_secs)),
            control_file: PathBuf::from(var_or("CONTROL_FILE", DEFAULT_CONTROL_FILE)),
            cors_allowed_origins: parse_origins(&origins),
        })
    }

    /// Configuration rooted at `repo_root`, everything else at defaults.
    pub fn for_repo(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        Self {
            bind_host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            minigames_dir: repo_root.join("minigames"),
            control_file: repo_root.join("controls.json"),
            repo_root,
            runner_url: DEFAULT_RUNNER_URL.to_string(),
            run_timeout: Duration::from_secs(DEFAULT_RUN_TIMEOUT_SECS),
            browser_result_timeout: Some(Duration::from_secs(
                DEFAULT_BROWSER_RESULT_TIMEOUT_SECS,
            )),
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::config(format!("{key} must be a valid number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}
