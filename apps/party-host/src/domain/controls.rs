//! Per-game control schemes.
//!
//! Phones send abstract button names; each game consumes a subset of them,
//! sometimes under its own name. The table below is data: onboarding a game
//! with a new layout means adding a row, and a manifest may override its row
//! with an explicit `controls` list.

use serde::Serialize;

/// Abstract buttons understood by every game that does not say otherwise.
pub const DEFAULT_BUTTONS: &[&str] = &["up", "down", "left", "right", "action"];

type Row = (&'static str, &'static [(&'static str, &'static str)]);

const DIRECTIONS: [(&str, &str); 4] = [
    ("up", "up"),
    ("down", "down"),
    ("left", "left"),
    ("right", "right"),
];

/// (game id, [(abstract button, game button)])
const SCHEME_TABLE: &[Row] = &[
    ("mg-racer", &DIRECTIONS),
    (
        "mg-bored-game",
        &[
            ("up", "up"),
            ("down", "down"),
            ("left", "left"),
            ("right", "right"),
            ("action", "use"),
            ("plant", "plant"),
            ("eat", "eat"),
            ("use", "use"),
        ],
    ),
    (
        "mg-portal-2d-pygame",
        &[
            ("up", "up"),
            ("down", "down"),
            ("left", "left"),
            ("right", "right"),
            ("action", "action"),
            ("aim_up", "aim_up"),
            ("aim_down", "aim_down"),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlScheme {
    mappings: Vec<ButtonMapping>,
}

impl Default for ControlScheme {
    fn default() -> Self {
        Self::identity(DEFAULT_BUTTONS.iter().copied())
    }
}

impl ControlScheme {
    fn identity<'a>(buttons: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            mappings: buttons
                .into_iter()
                .map(|b| ButtonMapping {
                    from: b.to_string(),
                    to: b.to_string(),
                })
                .collect(),
        }
    }

    /// Scheme for `game_id`: the manifest override if given, else the table
    /// row, else the default layout.
    pub fn for_game(game_id: &str, manifest_override: Option<&[String]>) -> Self {
        if let Some(buttons) = manifest_override.filter(|b| !b.is_empty()) {
            return Self::identity(buttons.iter().map(String::as_str));
        }

        SCHEME_TABLE
            .iter()
            .find(|(id, _)| *id == game_id)
            .map(|(_, rows)| Self {
                mappings: rows
                    .iter()
                    .map(|(from, to)| ButtonMapping {
                        from: from.to_string(),
                        to: to.to_string(),
                    })
                    .collect(),
            })
            .unwrap_or_default()
    }

    /// Game-side name of an abstract button; `None` means drop it.
    pub fn remap(&self, button: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.from == button)
            .map(|m| m.to.as_str())
    }

    /// Abstract buttons a phone should show for this game.
    pub fn hints(&self) -> Vec<String> {
        self.mappings.iter().map(|m| m.from.clone()).collect()
    }
}
