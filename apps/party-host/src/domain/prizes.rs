//! Prize calculation: raw scores to rankings, coins and stars.

use serde::{Deserialize, Serialize};

use crate::domain::PLAYERS;

/// Coins awarded per rank (index = rank - 1).
pub const COIN_TABLE: [u64; PLAYERS] = [10, 5, 3, 1];
/// Stars awarded per rank (index = rank - 1).
pub const STAR_TABLE: [u64; PLAYERS] = [1, 0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeLine {
    pub player: usize,
    pub score: u64,
    pub rank: u32,
    pub coins: u64,
    pub stars: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeResult {
    /// Competition rank (1..=4) of each player, indexed by player.
    pub rankings: [u32; PLAYERS],
    pub coins_awarded: [u64; PLAYERS],
    pub stars_awarded: [u64; PLAYERS],
    pub winner_index: usize,
    /// One line per player, in player order.
    pub breakdown: Vec<PrizeLine>,
}

/// Ranks the players and looks up their awards.
///
/// A valid `winner_hint` takes rank 1 alone; everyone else is ordered by
/// descending score with standard competition ranking (ties share a rank and
/// the next distinct score skips ahead, so `[50, 50, 10, 0]` ranks `1, 1, 3, 4`).
/// Equal scores keep player order among themselves.
pub fn calculate_prizes(scores: &[u64; PLAYERS], winner_hint: Option<usize>) -> PrizeResult {
    let forced = winner_hint.filter(|&w| w < PLAYERS);

    let mut order: Vec<usize> = (0..PLAYERS).collect();
    order.sort_by(|&a, &b| {
        let a_forced = Some(a) == forced;
        let b_forced = Some(b) == forced;
        b_forced
            .cmp(&a_forced)
            .then_with(|| scores[b].cmp(&scores[a]))
            .then_with(|| a.cmp(&b))
    });

    let mut rankings = [0u32; PLAYERS];
    for (position, &player) in order.iter().enumerate() {
        let rank = match position {
            0 => 1,
            _ => {
                let prev = order[position - 1];
                let shares_rank = Some(prev) != forced && scores[prev] == scores[player];
                if shares_rank {
                    rankings[prev]
                } else {
                    position as u32 + 1
                }
            }
        };
        rankings[player] = rank;
    }

    let mut coins_awarded = [0u64; PLAYERS];
    let mut stars_awarded = [0u64; PLAYERS];
    for player in 0..PLAYERS {
        let idx = rankings[player] as usize - 1;
        coins_awarded[player] = COIN_TABLE.get(idx).copied().unwrap_or(0);
        stars_awarded[player] = STAR_TABLE.get(idx).copied().unwrap_or(0);
    }

    let breakdown = (0..PLAYERS)
        .map(|player| PrizeLine {
            player,
            score: scores[player],
            rank: rankings[player],
            coins: coins_awarded[player],
            stars: stars_awarded[player],
        })
        .collect();

    PrizeResult {
        rankings,
        coins_awarded,
        stars_awarded,
        winner_index: order[0],
        breakdown,
    }
}
