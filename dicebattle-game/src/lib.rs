//! Dice Battle Game Engine
//!
//! Deterministic two-player dice-battle rules: seeded dice, tendencies,
//! strategy cards, shields, drawn events and carry-over effects. The crate
//! has no I/O and no global state; everything flows through one
//! [`GameState`] and its single RNG stream.

pub mod ai;
pub mod cards;
pub mod constants;
pub mod dice;
pub mod energy;
pub mod engine;
pub mod events;
pub mod observer;
pub mod result;
pub mod rng;
pub mod session;
pub mod shield;
pub mod state;

// Re-export commonly used types
pub use ai::{
    AiParams, Difficulty, apply_cards, choose_tendency, decide_post_roll_cards,
    decide_pre_roll_cards,
};
pub use cards::{Card, CardType, add_gauge, can_use_card, draw_card, use_card};
pub use dice::{Special, TendencyBonus, TendencyResult, resolve_special, resolve_tendency, roll_dice};
pub use energy::{EnergyError, EnergyEvent};
pub use engine::{finalize_round, run_round, start_round, start_round_ai};
pub use events::{DrawnEvent, EventCard, EventCategory, EventType, apply_event, draw_event};
pub use observer::{Phase, PhaseEvent, PhaseObserver};
pub use result::{GameOutcome, TieBreak, outcome, rank};
pub use rng::{DeterministicRng, shuffle};
pub use session::{BattleSession, SessionError};
pub use shield::{EffectKind, create_shield};
pub use state::{
    GameConfig, GameMode, GameState, LogEntry, PlayerState, RoundPhase, Side, SideScores, Tendency,
    normalize_seed,
};

/// Build a fresh game state. Equivalent to [`GameState::new`].
#[must_use]
pub fn create_initial_state(config: GameConfig, seed: u32) -> GameState {
    GameState::new(config, seed)
}
