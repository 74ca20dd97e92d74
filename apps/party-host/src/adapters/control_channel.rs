use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

type ButtonStates = BTreeMap<String, BTreeMap<String, bool>>;

/// Shared document of per-player button states, polled by out-of-process
/// games.
///
/// Shape: `{"1": {"up": true, "action": false}, ...}`. Every write replaces
/// the file atomically so a reader never sees a torn document.
pub struct ControlChannel {
    path: PathBuf,
    states: Mutex<ButtonStates>,
}

impl ControlChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            states: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records one button edge for `player` (1-based) and persists.
    pub fn set(&self, player: u8, button: &str, pressed: bool) -> io::Result<()> {
        let mut states = self.states.lock();
        states
            .entry(player.to_string())
            .or_default()
            .insert(button.to_string(), pressed);
        persist(&self.path, &states)
    }

    /// Releases every button; called at run start and end.
    pub fn clear(&self) -> io::Result<()> {
        let mut states = self.states.lock();
        states.clear();
        persist(&self.path, &states)
    }

    pub fn snapshot(&self) -> ButtonStates {
        self.states.lock().clone()
    }
}

fn persist(path: &Path, states: &ButtonStates) -> io::Result<()> {
    let json = serde_json::to_vec(states).map_err(io::Error::other)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "control channel written");
    Ok(())
}
