use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{PrizeResult, SessionState, PLAYERS};
use crate::manifest::{ExecutionMode, GameDescriptor};
use crate::services::dispatcher::RunPhase;

/// Inbound frames. Displays send `RESULT`; controllers send `JOIN`/`CONTROL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMsg {
    Join {
        #[serde(default)]
        player: Option<u8>,
    },
    Control {
        button: String,
        pressed: bool,
    },
    Result {
        payload: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMsg {
    State {
        payload: SessionSnapshot,
    },
    GameStarted {
        payload: GameStarted,
    },
    /// Tells display clients to load a browser-mode game.
    LoadGame {
        payload: GameStarted,
    },
    GameEnded {
        payload: GameEnded,
    },
    PrizesAwarded {
        payload: PrizesAwarded,
    },
    ControllerJoined {
        player: u8,
    },
    ControllerLeft {
        player: u8,
    },
    MobileControl {
        player: u8,
        button: String,
        pressed: bool,
    },
    PlayerAvailability {
        #[serde(rename = "takenPlayers")]
        taken_players: Vec<u8>,
    },
    Joined {
        player: u8,
        #[serde(rename = "controlHints")]
        control_hints: Vec<String>,
    },
    JoinFailed {
        error: String,
    },
    Error {
        code: String,
        message: String,
    },
}

/// Full session snapshot: the scoreboard plus the run in flight.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: SessionState,
    pub active_run: Option<ActiveRunView>,
    pub taken_players: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRunView {
    pub run_id: Uuid,
    pub game_id: String,
    pub mode: ExecutionMode,
    pub phase: RunPhase,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStarted {
    pub run_id: Uuid,
    pub mode: ExecutionMode,
    pub game: GameDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEnd {
    Settled,
    Failed,
    Cancelled,
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnded {
    pub run_id: Uuid,
    pub game_id: String,
    pub outcome: RunEnd,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizesAwarded {
    pub run_id: Uuid,
    pub game_id: String,
    pub prizes: PrizeResult,
    /// Cumulative totals after this settlement.
    pub coins: [u64; PLAYERS],
    pub stars: [u64; PLAYERS],
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_controller_frames() {
        let join: ClientMsg = serde_json::from_value(json!({"type": "JOIN"})).unwrap();
        assert!(matches!(join, ClientMsg::Join { player: None }));

        let join: ClientMsg = serde_json::from_value(json!({"type": "JOIN", "player": 3})).unwrap();
        assert!(matches!(join, ClientMsg::Join { player: Some(3) }));

        let control: ClientMsg =
            serde_json::from_value(json!({"type": "CONTROL", "button": "up", "pressed": true}))
                .unwrap();
        assert!(matches!(control, ClientMsg::Control { pressed: true, .. }));
    }

    #[test]
    fn server_frames_use_wire_names() {
        let joined = serde_json::to_value(ServerMsg::Joined {
            player: 2,
            control_hints: vec!["up".into()],
        })
        .unwrap();
        assert_eq!(joined, json!({"type": "JOINED", "player": 2, "controlHints": ["up"]}));

        let avail = serde_json::to_value(ServerMsg::PlayerAvailability {
            taken_players: vec![1, 3],
        })
        .unwrap();
        assert_eq!(avail, json!({"type": "PLAYER_AVAILABILITY", "takenPlayers": [1, 3]}));

        let control = serde_json::to_value(ServerMsg::MobileControl {
            player: 1,
            button: "left".into(),
            pressed: false,
        })
        .unwrap();
        assert_eq!(control["type"], "MOBILE_CONTROL");
    }

    #[test]
    fn state_snapshot_is_flat() {
        let snapshot = SessionSnapshot {
            state: SessionState::default(),
            active_run: None,
            taken_players: vec![2],
        };
        let value = serde_json::to_value(ServerMsg::State { payload: snapshot }).unwrap();
        assert_eq!(value["type"], "STATE");
        assert_eq!(value["payload"]["coins"], json!([0, 0, 0, 0]));
        assert_eq!(value["payload"]["activeRun"], serde_json::Value::Null);
        assert_eq!(value["payload"]["takenPlayers"], json!([2]));
        assert_eq!(value["payload"]["playerNames"][0], "P1");
    }
}
