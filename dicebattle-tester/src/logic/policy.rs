use std::fmt;
use std::str::FromStr;

use dicebattle_game::{
    AiParams, CardType, GameState, Side, Tendency, choose_tendency, decide_post_roll_cards,
    decide_pre_roll_cards,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Policy interface for automated play.
pub trait SeatPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Tendency to declare this round.
    fn pick_tendency(&mut self, state: &GameState, side: Side) -> Tendency;

    /// Cards to play before the die is cast. Only the human seat plays cards.
    fn pre_roll_cards(&mut self, _state: &GameState) -> Vec<CardType> {
        Vec::new()
    }

    /// Cards to play after the roll.
    fn post_roll_cards(&mut self, _state: &GameState) -> Vec<CardType> {
        Vec::new()
    }
}

/// Built-in strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Attack,
    Defense,
    Balance,
    Autopilot,
    Random,
}

impl Strategy {
    pub const ALL: &'static [Self] = &[
        Self::Attack,
        Self::Defense,
        Self::Balance,
        Self::Autopilot,
        Self::Random,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Balance => "balance",
            Self::Autopilot => "autopilot",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attack => "Always Attack",
            Self::Defense => "Always Defend",
            Self::Balance => "Always Balance",
            Self::Autopilot => "Autopilot",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64, params: AiParams) -> Box<dyn SeatPolicy> {
        match self {
            Self::Attack => Box::new(FixedPolicy(Tendency::Attack)),
            Self::Defense => Box::new(FixedPolicy(Tendency::Defense)),
            Self::Balance => Box::new(FixedPolicy(Tendency::Balance)),
            Self::Autopilot => Box::new(AutopilotPolicy { params }),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown strategy: {s}"))
    }
}

struct FixedPolicy(Tendency);

impl SeatPolicy for FixedPolicy {
    fn name(&self) -> &'static str {
        self.0.as_str()
    }

    fn pick_tendency(&mut self, _state: &GameState, _side: Side) -> Tendency {
        self.0
    }
}

struct AutopilotPolicy {
    params: AiParams,
}

impl SeatPolicy for AutopilotPolicy {
    fn name(&self) -> &'static str {
        "autopilot"
    }

    fn pick_tendency(&mut self, state: &GameState, side: Side) -> Tendency {
        choose_tendency(state, side, &self.params)
    }

    fn pre_roll_cards(&mut self, state: &GameState) -> Vec<CardType> {
        decide_pre_roll_cards(state, Side::Me, &self.params)
    }

    fn post_roll_cards(&mut self, state: &GameState) -> Vec<CardType> {
        decide_post_roll_cards(state, Side::Me, &self.params)
    }
}

/// Uniform tendency picks from its own ChaCha stream, so the game RNG is
/// never touched by the policy.
struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl SeatPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick_tendency(&mut self, _state: &GameState, _side: Side) -> Tendency {
        Tendency::ALL[self.rng.random_range(0..Tendency::ALL.len())]
    }
}
