use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ControlScheme;

/// How a minigame is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Spawned locally; reports through a `RESULT:` stdout line.
    Subprocess,
    /// Delegated to the sandboxed runner service over HTTP.
    Remote,
    /// Rendered by the display client; result arrives asynchronously.
    Browser,
}

impl ExecutionMode {
    /// Parses a manifest `type`, accepting the legacy tags.
    pub fn from_manifest_type(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "subprocess" | "node" => Some(Self::Subprocess),
            "remote" | "pygame" => Some(Self::Remote),
            "browser" | "js" => Some(Self::Browser),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subprocess => "subprocess",
            Self::Remote => "remote",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A minigame as declared by its manifest. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDescriptor {
    pub id: String,
    pub name: String,
    pub execution_mode: ExecutionMode,
    /// Entry path relative to the repository root.
    pub entry_path: String,
    pub player_count: u8,
    /// Directory under the minigames dir holding the manifest.
    pub folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<String>>,
}

impl GameDescriptor {
    pub fn control_scheme(&self) -> ControlScheme {
        ControlScheme::for_game(&self.id, self.controls.as_deref())
    }
}

/// On-disk shape of `manifest.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct ManifestFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub entry: String,
    pub players: Option<u8>,
    pub controls: Option<Vec<String>>,
}
