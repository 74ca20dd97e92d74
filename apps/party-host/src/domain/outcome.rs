//! Strict result grammar shared by every execution mode.
//!
//! A result is a JSON object with `scores` (exactly four non-negative
//! integers), an optional integer `winner` and an optional `meta` object.
//! Anything else is rejected; nothing is coerced.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::PLAYERS;
use crate::errors::RunError;

/// Prefix of the one stdout line a subprocess reports its result on.
pub const RESULT_SENTINEL: &str = "RESULT:";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawResult {
    pub scores: [u64; PLAYERS],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl RawResult {
    pub fn new(scores: [u64; PLAYERS], winner: Option<usize>) -> Self {
        Self {
            scores,
            winner,
            meta: None,
        }
    }

    pub fn from_json(value: &Value) -> Result<Self, RunError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RunError::malformed("result must be a JSON object"))?;
        Self::from_object(obj)
    }

    fn from_object(obj: &Map<String, Value>) -> Result<Self, RunError> {
        let raw_scores = obj
            .get("scores")
            .and_then(Value::as_array)
            .ok_or_else(|| RunError::malformed("missing `scores` array"))?;

        if raw_scores.len() != PLAYERS {
            return Err(RunError::malformed(format!(
                "`scores` must have exactly {PLAYERS} entries, got {}",
                raw_scores.len()
            )));
        }

        let mut scores = [0u64; PLAYERS];
        for (slot, value) in scores.iter_mut().zip(raw_scores) {
            *slot = value.as_u64().ok_or_else(|| {
                RunError::malformed(format!("score {value} is not a non-negative integer"))
            })?;
        }

        let winner = match obj.get("winner") {
            None | Some(Value::Null) => None,
            Some(value) => {
                let idx = value.as_u64().ok_or_else(|| {
                    RunError::malformed(format!("winner {value} is not a non-negative integer"))
                })?;
                Some(idx as usize)
            }
        };

        let meta = match obj.get("meta") {
            None | Some(Value::Null) => None,
            Some(value @ Value::Object(_)) => Some(value.clone()),
            Some(other) => {
                return Err(RunError::malformed(format!(
                    "`meta` must be an object, got {other}"
                )))
            }
        };

        Ok(Self {
            scores,
            winner,
            meta,
        })
    }
}

/// Result posted by an in-page game: `{gameId?, scores, winner?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserResult {
    pub game_id: Option<String>,
    pub result: RawResult,
}

impl BrowserResult {
    pub fn from_json(value: &Value) -> Result<Self, RunError> {
        let obj = value
            .as_object()
            .ok_or_else(|| RunError::malformed("result payload must be a JSON object"))?;

        let game_id = match obj.get("gameId") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(other) => {
                return Err(RunError::malformed(format!(
                    "`gameId` must be a string, got {other}"
                )))
            }
        };

        Ok(Self {
            game_id,
            result: RawResult::from_object(obj)?,
        })
    }
}

/// Parses a single output line.
///
/// Returns `None` when the line is not a sentinel line, otherwise the parsed
/// payload or the reason it was rejected.
pub fn parse_sentinel_line(line: &str) -> Option<Result<RawResult, RunError>> {
    let payload = line.trim_end_matches(&['\r', '\n'][..]).strip_prefix(RESULT_SENTINEL)?;
    let payload = payload.trim();

    let parsed = serde_json::from_str::<Value>(payload)
        .map_err(|e| RunError::malformed_raw(format!("invalid RESULT JSON: {e}"), payload))
        .and_then(|value| {
            RawResult::from_json(&value).map_err(|err| match err {
                RunError::MalformedResult { reason, .. } => {
                    RunError::malformed_raw(reason, payload)
                }
                other => other,
            })
        });

    Some(parsed)
}
