//! Cumulative scoreboard of the session.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::prizes::PrizeResult;
use crate::domain::PLAYERS;

/// Number of settled runs kept in `prize_history`.
pub const PRIZE_HISTORY_LIMIT: usize = 10;

/// One settled run. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub game_id: String,
    pub raw_scores: [u64; PLAYERS],
    pub prizes: PrizeResult,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl RunRecord {
    pub fn new(game_id: impl Into<String>, raw_scores: [u64; PLAYERS], prizes: PrizeResult) -> Self {
        Self {
            game_id: game_id.into(),
            raw_scores,
            prizes,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub player_names: [String; PLAYERS],
    pub scores: [u64; PLAYERS],
    pub coins: [u64; PLAYERS],
    pub stars: [u64; PLAYERS],
    pub last_result: Option<RunRecord>,
    /// Most recent settled runs, oldest first.
    pub prize_history: VecDeque<RunRecord>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            player_names: ["P1", "P2", "P3", "P4"].map(String::from),
            scores: [0; PLAYERS],
            coins: [0; PLAYERS],
            stars: [0; PLAYERS],
            last_result: None,
            prize_history: VecDeque::with_capacity(PRIZE_HISTORY_LIMIT),
        }
    }
}

impl SessionState {
    /// Adds a settled run onto the running totals.
    ///
    /// Purely additive and not deduplicated: applying the same record twice
    /// counts it twice.
    pub fn apply_result(&mut self, record: RunRecord) {
        for player in 0..PLAYERS {
            self.scores[player] = self.scores[player].saturating_add(record.raw_scores[player]);
            self.coins[player] =
                self.coins[player].saturating_add(record.prizes.coins_awarded[player]);
            self.stars[player] =
                self.stars[player].saturating_add(record.prizes.stars_awarded[player]);
        }

        if self.prize_history.len() == PRIZE_HISTORY_LIMIT {
            self.prize_history.pop_front();
        }
        self.prize_history.push_back(record.clone());
        self.last_result = Some(record);
    }

    /// Zeroes totals and history; player names are kept.
    pub fn reset(&mut self) {
        let names = std::mem::take(&mut self.player_names);
        *self = Self {
            player_names: names,
            ..Self::default()
        };
    }
}
