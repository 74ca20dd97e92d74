use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::manifest::descriptor::{ExecutionMode, GameDescriptor, ManifestFile};

const MANIFEST_FILE: &str = "manifest.json";
const DEFAULT_PLAYERS: u8 = 4;

/// Reads minigame descriptors from `<minigames_dir>/<folder>/manifest.json`.
///
/// Nothing is cached: every listing re-reads the directory so edited games
/// are picked up without a restart.
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    minigames_dir: PathBuf,
}

impl ManifestRegistry {
    pub fn new(minigames_dir: impl Into<PathBuf>) -> Self {
        Self {
            minigames_dir: minigames_dir.into(),
        }
    }

    pub fn minigames_dir(&self) -> &Path {
        &self.minigames_dir
    }

    /// All valid descriptors sorted by id.
    ///
    /// A missing directory yields an empty list. Folders starting with `_`
    /// are templates and skipped; missing or malformed manifests are skipped.
    pub fn list_games(&self) -> Vec<GameDescriptor> {
        let entries = match fs::read_dir(&self.minigames_dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(
                    dir = %self.minigames_dir.display(),
                    error = %err,
                    "minigames directory unreadable, listing nothing"
                );
                return Vec::new();
            }
        };

        let mut games: Vec<GameDescriptor> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| {
                let folder = entry.file_name().to_string_lossy().into_owned();
                if folder.starts_with('_') {
                    return None;
                }
                read_descriptor(&entry.path(), &folder)
            })
            .collect();

        games.sort_by(|a, b| a.id.cmp(&b.id));
        games
    }

    pub fn find(&self, game_id: &str) -> Option<GameDescriptor> {
        self.list_games().into_iter().find(|g| g.id == game_id)
    }
}

fn read_descriptor(dir: &Path, folder: &str) -> Option<GameDescriptor> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let raw = fs::read_to_string(&manifest_path).ok()?;

    let manifest: ManifestFile = match serde_json::from_str(&raw) {
        Ok(m) => m,
        Err(err) => {
            warn!(path = %manifest_path.display(), error = %err, "ignoring bad manifest");
            return None;
        }
    };

    let Some(execution_mode) = ExecutionMode::from_manifest_type(&manifest.kind) else {
        warn!(
            path = %manifest_path.display(),
            kind = %manifest.kind,
            "ignoring manifest with unknown type"
        );
        return None;
    };

    if manifest.id.trim().is_empty() || manifest.entry.trim().is_empty() {
        warn!(path = %manifest_path.display(), "ignoring manifest without id or entry");
        return None;
    }

    Some(GameDescriptor {
        entry_path: normalize_entry(&manifest.entry, folder),
        id: manifest.id,
        name: manifest.name,
        execution_mode,
        player_count: manifest.players.unwrap_or(DEFAULT_PLAYERS),
        folder: folder.to_string(),
        controls: manifest.controls,
    })
}

/// Entry paths are stored relative to the repository root.
fn normalize_entry(entry: &str, folder: &str) -> String {
    let entry = entry.trim_start_matches("./");
    if entry.starts_with("minigames/") {
        entry.to_string()
    } else {
        format!("minigames/{folder}/{entry}")
    }
}
