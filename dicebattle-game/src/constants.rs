//! Centralized balance and tuning constants for Dice Battle.
//!
//! These values define the deterministic math for the round engine. Keeping
//! them together means balance only changes through reviewed code, never
//! through external assets.

// Audit log tags ------------------------------------------------------------
pub(crate) const LOG_PHASE_INIT: &str = "phase.init";
pub(crate) const LOG_ROUND_ROLL: &str = "round.roll";
pub(crate) const LOG_ROUND_ROLL_AI: &str = "round.roll.ai";
pub(crate) const LOG_SPECIAL: &str = "dice.special";
pub(crate) const LOG_SPECIAL_AI: &str = "dice.special.ai";
pub(crate) const LOG_BONUS_ROLL: &str = "bonus.roll";
pub(crate) const LOG_CURSE_APPLIED: &str = "scheduled.curse";
pub(crate) const LOG_LUCKY_REROLL: &str = "scheduled.lucky";
pub(crate) const LOG_CARD_PLAYED: &str = "card.played";
pub(crate) const LOG_CARD_ATTACK: &str = "card.attack";
pub(crate) const LOG_CARD_STEAL: &str = "card.steal";
pub(crate) const LOG_CARD_DRAW: &str = "card.draw";
pub(crate) const LOG_CARD_DRAW_EMPTY: &str = "card.draw.empty";
pub(crate) const LOG_GAUGE_FREE_DRAW: &str = "gauge.free-draw";
pub(crate) const LOG_SHIELD_CREATED: &str = "shield.created";
pub(crate) const LOG_EVENT_DRAWN: &str = "event.drawn";
pub(crate) const LOG_EVENT_EMPTY: &str = "event.draw.empty";
pub(crate) const LOG_SCORE_FINAL: &str = "score.final";
pub(crate) const LOG_ROUND_END: &str = "round.end";

// Resource caps ---------------------------------------------------------------
pub const ENERGY_MAX: u8 = 10;
pub const SHIELD_MAX: u8 = 2;
pub const TOTAL_MIN: i32 = 1;
pub const MAX_CARDS_PER_ROUND: usize = 2;

// Energy tuning ---------------------------------------------------------------
pub(crate) const ROUND_ENERGY_BASE: u8 = 2;
pub(crate) const ROUND_ENERGY_AFTER_LOSS: u8 = 3;
pub(crate) const BALANCE_ENERGY_BONUS: u8 = 1;
pub(crate) const WINNER_ENERGY_BONUS: u8 = 1;
pub(crate) const CHARGE_FULL_STEP: u8 = 3;
pub(crate) const CHARGE_FULL_CEILING: u8 = 7;
pub(crate) const CHARGE_PARTIAL_STEP: u8 = 2;
pub(crate) const CHARGE_PARTIAL_CEILING: u8 = 9;
pub(crate) const DRAIN_AMOUNT: u8 = 2;
pub(crate) const DRAIN_THRESHOLD: u8 = 3;
pub(crate) const DRAIN_FLOOR: u8 = 1;
pub(crate) const SHIELD_CREATE_COST: u8 = 3;

// Card costs and effects ----------------------------------------------------
pub(crate) const COST_ATTACK: u8 = 2;
pub(crate) const COST_DEFENSE: u8 = 1;
pub(crate) const COST_BOOST: u8 = 4;
pub(crate) const COST_STEAL: u8 = 2;
pub(crate) const COST_RESET: u8 = 4;
pub(crate) const ATTACK_CARD_DAMAGE: i32 = 3;
pub(crate) const STEAL_BASE: u8 = 1;
pub(crate) const STEAL_SPREAD: u32 = 2;

// Gauge tuning ----------------------------------------------------------------
pub const GAUGE_PER_CARD: u32 = 5;
pub(crate) const HIGH_SCORE_GAUGE_THRESHOLD: i32 = 15;
pub(crate) const REPEAT_FACE_THRESHOLD: u32 = 2;
pub(crate) const CONSECUTIVE_SIX_THRESHOLD: u32 = 2;
pub(crate) const LOSS_STREAK_GAUGE: u32 = 2;
pub(crate) const WIN_STREAK_GAUGE: u32 = 3;

// Dice tuning -----------------------------------------------------------------
pub const DIE_FACES: u32 = 6;
pub(crate) const ATTACK_SUCCESS_MIN: u8 = 4;
pub(crate) const ATTACK_FAIL_SCORE: i32 = 1;
pub(crate) const ATTACK_SIX_BONUS: i32 = 3;
pub(crate) const DEFENSE_SUCCESS_MIN: u8 = 2;
pub(crate) const DEFENSE_SUCCESS_MAX: u8 = 5;
pub(crate) const LIGHTNING_PENALTY: i32 = 2;
pub(crate) const FLAME_PENALTY: i32 = 3;
pub(crate) const FLAME_CURSE: u32 = 1;
pub(crate) const STAR_BONUS_BASE: i32 = 2;
pub(crate) const STAR_BONUS_SPREAD: u32 = 5;

// Event tuning ----------------------------------------------------------------
pub(crate) const SCORE_BOOST_AMOUNT: i32 = 2;
pub(crate) const CURSE_EVENT_PENALTY: u32 = 2;
pub(crate) const BOMB_FLOOR: i32 = 3;
pub(crate) const THIEF_AMOUNT: i32 = 2;
pub(crate) const THIEF_MIN_TOTAL: i32 = 5;
pub(crate) const SWAP_MIN_DIFF: i32 = 3;

// Deck composition ------------------------------------------------------------
pub(crate) const CARD_DECK_ATTACK: usize = 7;
pub(crate) const CARD_DECK_DEFENSE: usize = 7;
pub(crate) const CARD_DECK_BOOST: usize = 3;
pub(crate) const CARD_DECK_STEAL: usize = 2;
pub(crate) const CARD_DECK_RESET: usize = 1;
pub(crate) const EVENT_DECK_NONE: usize = 8;
pub(crate) const EVENT_DECK_POSITIVE: usize = 4;
pub(crate) const EVENT_DECK_NEGATIVE: usize = 4;
pub(crate) const EVENT_DECK_NEUTRAL: usize = 4;

// Defaults ----------------------------------------------------------------------
pub const DEFAULT_SEED: u32 = 123_456;
pub const DEFAULT_ROUNDS: u32 = 8;
pub(crate) const QUICK_ROUNDS: u32 = 5;
pub(crate) const EXTENDED_ROUNDS: u32 = 12;
