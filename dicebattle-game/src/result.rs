//! Final ranking once every round has been played.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::state::{GameState, Side, SideScores};

/// Which comparison settled the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    Total,
    LastRoundScore,
    Energy,
    HandSize,
    Draw,
}

impl TieBreak {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::LastRoundScore => "last_round_score",
            Self::Energy => "energy",
            Self::HandSize => "hand_size",
            Self::Draw => "draw",
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Option<Side>,
    pub decided_by: TieBreak,
    pub totals: SideScores,
}

impl GameOutcome {
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Rank the two seats as the state stands, regardless of rounds left.
#[must_use]
pub fn rank(state: &GameState) -> GameOutcome {
    let me = &state.players.me;
    let ai = &state.players.ai;
    let last = state.stats.last_round_scores;
    let ladder = [
        (TieBreak::Total, me.total.cmp(&ai.total)),
        (TieBreak::LastRoundScore, last.me.cmp(&last.ai)),
        (TieBreak::Energy, me.energy.cmp(&ai.energy)),
        (TieBreak::HandSize, me.cards.len().cmp(&ai.cards.len())),
    ];
    let (decided_by, winner) = ladder
        .into_iter()
        .find_map(|(level, ord)| match ord {
            Ordering::Greater => Some((level, Some(Side::Me))),
            Ordering::Less => Some((level, Some(Side::Ai))),
            Ordering::Equal => None,
        })
        .unwrap_or((TieBreak::Draw, None));
    GameOutcome {
        winner,
        decided_by,
        totals: SideScores {
            me: me.total,
            ai: ai.total,
        },
    }
}

/// Final outcome, or `None` while rounds remain.
#[must_use]
pub fn outcome(state: &GameState) -> Option<GameOutcome> {
    state.is_finished().then(|| rank(state))
}
