use std::fs;
use std::path::Path;
use std::time::Duration;

use party_host::config::HostConfig;
use party_host::infra::state::build_state;
use party_host::state::AppState;
use serde_json::json;
use tempfile::TempDir;

/// Game that reports player 0 as the forced winner.
pub const DUCK_ATTACK_SCRIPT: &str = r#"echo "quack quack"
echo 'RESULT: {"scores":[30,10,0,0],"winner":0}'
"#;

/// A scratch repository root with a `minigames/` directory.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("minigames")).expect("minigames dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Config rooted here with a short run budget so timeouts stay quick.
    pub fn config(&self) -> HostConfig {
        let mut config = HostConfig::for_repo(self.root());
        config.run_timeout = Duration::from_secs(5);
        config
    }

    pub fn state(&self) -> AppState {
        self.state_with(self.config())
    }

    pub fn state_with(&self, config: HostConfig) -> AppState {
        build_state()
            .with_config(config)
            .build()
            .expect("state builds")
    }

    fn write_manifest(&self, id: &str, kind: &str, entry: &str) -> std::path::PathBuf {
        let folder = self.root().join("minigames").join(id);
        fs::create_dir_all(&folder).expect("game folder");
        fs::write(
            folder.join("manifest.json"),
            json!({"id": id, "name": id, "type": kind, "entry": entry}).to_string(),
        )
        .expect("manifest");
        folder
    }

    /// Subprocess game run as `sh game.sh`.
    pub fn add_script_game(&self, id: &str, script: &str) {
        let folder = self.write_manifest(id, "subprocess", "game.sh");
        fs::write(folder.join("game.sh"), script).expect("script");
    }

    pub fn add_browser_game(&self, id: &str) {
        let folder = self.write_manifest(id, "browser", "index.html");
        fs::write(folder.join("index.html"), "<canvas></canvas>").expect("bundle");
    }

    pub fn add_remote_game(&self, id: &str) {
        self.write_manifest(id, "pygame", "main.py");
    }

    pub fn control_file(&self) -> std::path::PathBuf {
        self.config().control_file
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
