//! Autopilot heuristics. Every decision is a pure function of the state and a
//! parameter set; none of them touch the RNG.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cards::{self, CardType};
use crate::constants::MAX_CARDS_PER_ROUND;
use crate::energy::EnergyError;
use crate::state::{GameState, Side, Tendency};

const ATTACK_ENERGY: u8 = 6;
const BOOST_MIN_ENERGY: u8 = 4;
const BOOST_EAGER_ENERGY: u8 = 6;
const ATTACK_CARD_MIN_ENERGY: u8 = 2;
const ATTACK_CARD_MIN_SHIELDS: u8 = 1;
const STEAL_MIN_ENERGY: u8 = 2;
const STEAL_MAX_ENERGY: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: &'static [Self] = &[Self::Easy, Self::Normal, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    #[must_use]
    pub const fn params(self) -> AiParams {
        match self {
            Self::Easy => AiParams {
                diff_attack: 4,
                diff_defense: 4,
                balance_energy: 1,
                card_use_rate: 0.3,
                target_shields_min: 0,
                target_shields_max: 1,
            },
            Self::Normal => AiParams {
                diff_attack: 3,
                diff_defense: 3,
                balance_energy: 2,
                card_use_rate: 0.6,
                target_shields_min: 1,
                target_shields_max: 2,
            },
            Self::Hard => AiParams {
                diff_attack: 2,
                diff_defense: 2,
                balance_energy: 3,
                card_use_rate: 0.9,
                target_shields_min: 1,
                target_shields_max: 2,
            },
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// Heuristic thresholds. `balance_energy`, `card_use_rate` and
/// `target_shields_max` are carried for tuning tables but the current
/// heuristics do not read them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiParams {
    pub diff_attack: i32,
    pub diff_defense: i32,
    pub balance_energy: u8,
    pub card_use_rate: f32,
    pub target_shields_min: u8,
    pub target_shields_max: u8,
}

impl Default for AiParams {
    fn default() -> Self {
        Difficulty::Normal.params()
    }
}

/// Attack when trailing or flush with energy, defend when ahead or
/// unshielded, otherwise balance.
#[must_use]
pub fn choose_tendency(state: &GameState, side: Side, params: &AiParams) -> Tendency {
    let own = state.players.get(side);
    let diff = own.total - state.players.get(side.opponent()).total;
    if diff <= -params.diff_attack || own.energy >= ATTACK_ENERGY {
        Tendency::Attack
    } else if diff >= params.diff_defense || own.shields == 0 {
        Tendency::Defense
    } else {
        Tendency::Balance
    }
}

struct Planner<'a> {
    state: &'a GameState,
    side: Side,
    picks: Vec<CardType>,
}

impl<'a> Planner<'a> {
    fn new(state: &'a GameState, side: Side) -> Self {
        Self {
            state,
            side,
            picks: Vec::new(),
        }
    }

    fn slots_left(&self) -> bool {
        let used = match self.side {
            Side::Me => self.state.round.used_cards.len(),
            Side::Ai => 0,
        };
        used + self.picks.len() < MAX_CARDS_PER_ROUND
    }

    fn holds(&self, card_type: CardType) -> bool {
        self.state
            .players
            .get(self.side)
            .cards
            .iter()
            .any(|c| c.card_type == card_type)
    }

    fn consider(&mut self, card_type: CardType, wanted: bool) {
        if wanted && self.slots_left() && self.holds(card_type) {
            self.picks.push(card_type);
        }
    }
}

/// Cards to play before rolling: top up shields, then boost when a big
/// round is likely.
#[must_use]
pub fn decide_pre_roll_cards(state: &GameState, side: Side, params: &AiParams) -> Vec<CardType> {
    let own = state.players.get(side);
    let mut plan = Planner::new(state, side);
    plan.consider(CardType::Defense, own.shields < params.target_shields_min);
    plan.consider(
        CardType::Boost,
        own.energy >= BOOST_MIN_ENERGY
            && (state.scheduled.bonus_turn_next || own.energy >= BOOST_EAGER_ENERGY),
    );
    plan.picks
}

/// Cards to play after rolling. Reset is never chosen automatically.
#[must_use]
pub fn decide_post_roll_cards(state: &GameState, side: Side, _params: &AiParams) -> Vec<CardType> {
    let own = state.players.get(side);
    let mut plan = Planner::new(state, side);
    plan.consider(
        CardType::Attack,
        own.energy >= ATTACK_CARD_MIN_ENERGY && own.shields >= ATTACK_CARD_MIN_SHIELDS,
    );
    plan.consider(
        CardType::Steal,
        (STEAL_MIN_ENERGY..=STEAL_MAX_ENERGY).contains(&own.energy),
    );
    plan.picks
}

/// Feed decisions through [`cards::use_card`] for the human seat, skipping
/// anything the remaining energy cannot pay for. Returns how many cards
/// were played.
///
/// # Errors
///
/// Propagates [`EnergyError`] from the card system; affordability is checked
/// first, so this only fires if the state changes underneath.
pub fn apply_cards(state: &mut GameState, picks: &[CardType]) -> Result<usize, EnergyError> {
    let mut played = 0;
    for &card_type in picks {
        if state.players.me.energy < card_type.cost() {
            log::debug!("autopilot skips {card_type}: not enough energy");
            continue;
        }
        if cards::use_card(state, card_type)? {
            played += 1;
        }
    }
    Ok(played)
}
