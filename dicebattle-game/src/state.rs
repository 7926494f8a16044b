//! Game state aggregate: configuration, seats, decks, scheduled effects and stats.
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::cards::{self, Card};
use crate::constants::{
    DEFAULT_ROUNDS, DEFAULT_SEED, ENERGY_MAX, EXTENDED_ROUNDS, LOG_PHASE_INIT,
    MAX_CARDS_PER_ROUND, QUICK_ROUNDS, SHIELD_MAX, TOTAL_MIN,
};
use crate::events::{self, EventCard};
use crate::rng::DeterministicRng;

/// One of the two seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Me,
    Ai,
}

impl Side {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Me => "me",
            Self::Ai => "ai",
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Me => Self::Ai,
            Self::Ai => Self::Me,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy declared for a round before the die is cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tendency {
    Attack,
    Defense,
    Balance,
}

impl Tendency {
    pub const ALL: &'static [Self] = &[Self::Attack, Self::Defense, Self::Balance];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Balance => "balance",
        }
    }
}

impl fmt::Display for Tendency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tendency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(Self::Attack),
            "defense" => Ok(Self::Defense),
            "balance" => Ok(Self::Balance),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Quick,
    #[default]
    Normal,
    Extended,
}

impl GameMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Normal => "normal",
            Self::Extended => "extended",
        }
    }

    /// Suggested number of rounds for the mode.
    #[must_use]
    pub const fn rounds(self) -> u32 {
        match self {
            Self::Quick => QUICK_ROUNDS,
            Self::Normal => DEFAULT_ROUNDS,
            Self::Extended => EXTENDED_ROUNDS,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "normal" => Ok(Self::Normal),
            "extended" => Ok(Self::Extended),
            _ => Err(()),
        }
    }
}

/// Immutable game configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rounds: u32,
    #[serde(default)]
    pub mode: GameMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_mode(GameMode::Normal)
    }
}

impl GameConfig {
    #[must_use]
    pub const fn for_mode(mode: GameMode) -> Self {
        Self {
            rounds: mode.rounds(),
            mode,
        }
    }

    #[must_use]
    pub const fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Replace out-of-range values with defaults. Callers normalise; the
    /// engine takes whatever it is given.
    #[must_use]
    pub const fn normalized(self) -> Self {
        if self.rounds == 0 {
            Self {
                rounds: DEFAULT_ROUNDS,
                mode: self.mode,
            }
        } else {
            self
        }
    }
}

/// Map a seed that would stall xorshift (zero) onto the default seed.
#[must_use]
pub const fn normalize_seed(seed: u32) -> u32 {
    if seed == 0 { DEFAULT_SEED } else { seed }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub total: i32,
    pub energy: u8,
    pub shields: u8,
    pub gauge: u32,
    pub cards: Vec<Card>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            total: TOTAL_MIN,
            energy: 0,
            shields: 0,
            gauge: 0,
            cards: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub me: PlayerState,
    pub ai: PlayerState,
}

impl Players {
    #[must_use]
    pub const fn get(&self, side: Side) -> &PlayerState {
        match side {
            Side::Me => &self.me,
            Side::Ai => &self.ai,
        }
    }

    pub const fn get_mut(&mut self, side: Side) -> &mut PlayerState {
        match side {
            Side::Me => &mut self.me,
            Side::Ai => &mut self.ai,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideScores {
    pub me: i32,
    pub ai: i32,
}

impl SideScores {
    #[must_use]
    pub const fn get(self, side: Side) -> i32 {
        match side {
            Side::Me => self.me,
            Side::Ai => self.ai,
        }
    }
}

/// Which cards are playable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundPhase {
    PreRoll,
    PostRoll,
    Finished,
}

/// Per-round scratch, reset at finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub index: u32,
    pub tendency: Option<Tendency>,
    pub roll: Option<u8>,
    pub roll_me: Option<u8>,
    pub roll_ai: Option<u8>,
    pub used_cards: SmallVec<[Card; MAX_CARDS_PER_ROUND]>,
    pub current_score: i32,
    pub current_scores: SideScores,
    pub temp_score: i32,
    pub score_boost: i32,
    pub score_boost_ai: i32,
    pub boost_active: bool,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            index: 1,
            tendency: None,
            roll: None,
            roll_me: None,
            roll_ai: None,
            used_cards: SmallVec::new(),
            current_score: 0,
            current_scores: SideScores::default(),
            temp_score: 0,
            score_boost: 0,
            score_boost_ai: 0,
            boost_active: false,
        }
    }
}

impl RoundState {
    #[must_use]
    pub(crate) fn next(&self) -> Self {
        Self {
            index: self.index + 1,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile<T> {
    pub draw: Vec<T>,
    pub discard: Vec<T>,
}

impl<T> Default for Pile<T> {
    fn default() -> Self {
        Self {
            draw: Vec::new(),
            discard: Vec::new(),
        }
    }
}

impl<T> Pile<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.draw.len() + self.discard.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draw.is_empty() && self.discard.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decks {
    pub cards: Pile<Card>,
    pub events: Pile<EventCard>,
}

/// Effects recorded this round that fire on the next `start_round`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduled {
    pub luck_next: bool,
    pub curse_next: u32,
    pub bonus_turn_next: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub roll_counts: BTreeMap<u8, u32>,
    pub consec_six: u32,
    pub last_winner: Option<Side>,
    pub win_streak_me: u32,
    pub loss_streak_me: u32,
    pub win_streak_ai: u32,
    pub loss_streak_ai: u32,
    /// Round scores of the most recently finalized round.
    pub last_round_scores: SideScores,
}

/// One audit entry. Tags are stable dotted keys; payloads are free-form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub tag: String,
    pub payload: Value,
}

/// The single aggregate threaded through every engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub round: RoundState,
    pub players: Players,
    pub decks: Decks,
    pub scheduled: Scheduled,
    pub stats: Stats,
    pub log: Vec<LogEntry>,
    pub rng: DeterministicRng,
}

impl GameState {
    /// Build a fresh game: shuffle the strategy deck, then the event deck,
    /// then record `phase.init`.
    #[must_use]
    pub fn new(config: GameConfig, seed: u32) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let cards = cards::build_deck(&mut rng);
        let events = events::build_event_deck(&mut rng);
        let mut state = Self {
            config,
            round: RoundState::default(),
            players: Players::default(),
            decks: Decks {
                cards: Pile {
                    draw: cards,
                    discard: Vec::new(),
                },
                events: Pile {
                    draw: events,
                    discard: Vec::new(),
                },
            },
            scheduled: Scheduled::default(),
            stats: Stats::default(),
            log: Vec::new(),
            rng,
        };
        state.push_log(
            LOG_PHASE_INIT,
            json!({ "seed": seed, "rounds": config.rounds }),
        );
        log::debug!("new game seed={seed} rounds={} mode={}", config.rounds, config.mode);
        state
    }

    /// Append an audit entry. Logic never reads these back.
    pub fn push_log(&mut self, tag: &str, payload: Value) {
        self.log.push(LogEntry {
            tag: tag.to_string(),
            payload,
        });
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.round.index > self.config.rounds
    }

    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        if self.is_finished() {
            RoundPhase::Finished
        } else if self.round.roll.is_none() {
            RoundPhase::PreRoll
        } else {
            RoundPhase::PostRoll
        }
    }

    /// Number of completed rounds.
    #[must_use]
    pub const fn rounds_played(&self) -> u32 {
        self.round.index.saturating_sub(1)
    }

    /// Describe every broken numeric invariant. Empty when the state is sound.
    #[must_use]
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for side in [Side::Me, Side::Ai] {
            let player = self.players.get(side);
            if player.energy > ENERGY_MAX {
                issues.push(format!("{side} energy {} above {ENERGY_MAX}", player.energy));
            }
            if player.shields > SHIELD_MAX {
                issues.push(format!("{side} shields {} above {SHIELD_MAX}", player.shields));
            }
            if player.total < TOTAL_MIN {
                issues.push(format!("{side} total {} below {TOTAL_MIN}", player.total));
            }
        }
        let used = &self.round.used_cards;
        if used.len() > MAX_CARDS_PER_ROUND {
            issues.push(format!("{} cards used this round", used.len()));
        }
        for (idx, card) in used.iter().enumerate() {
            if used[..idx].iter().any(|c| c.card_type == card.card_type) {
                issues.push(format!("{} card used twice this round", card.card_type));
            }
        }
        if self.round.roll.is_none()
            && used
                .iter()
                .any(|c| c.card_type.phase() != RoundPhase::PreRoll)
        {
            issues.push("post-roll card used before rolling".to_string());
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_matches_defaults() {
        let state = GameState::new(GameConfig::default(), DEFAULT_SEED);
        assert_eq!(state.round.index, 1);
        assert_eq!(state.phase(), RoundPhase::PreRoll);
        assert_eq!(state.players.me.total, 1);
        assert_eq!(state.players.ai.energy, 0);
        assert_eq!(state.decks.cards.draw.len(), 20);
        assert_eq!(state.decks.events.draw.len(), 20);
        assert_eq!(state.rng.draws(), 38);
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.log[0].tag, "phase.init");
        assert_eq!(state.log[0].payload["seed"], 123_456);
        assert_eq!(state.log[0].payload["rounds"], 8);
        assert!(state.invariant_violations().is_empty());
    }

    #[test]
    fn config_normalisation_and_modes() {
        assert_eq!(GameConfig::for_mode(GameMode::Quick).rounds, 5);
        assert_eq!(GameConfig::for_mode(GameMode::Extended).rounds, 12);
        let zero = GameConfig::default().with_rounds(0);
        assert_eq!(zero.normalized().rounds, 8);
        assert_eq!(normalize_seed(0), DEFAULT_SEED);
        assert_eq!(normalize_seed(7), 7);
        assert_eq!("Extended".parse::<GameMode>(), Ok(GameMode::Extended));
        assert_eq!(" balance ".parse::<Tendency>(), Ok(Tendency::Balance));
        assert!("panic".parse::<Tendency>().is_err());
    }

    #[test]
    fn zero_rounds_is_finished_immediately() {
        let state = GameState::new(GameConfig::default().with_rounds(0), 5);
        assert!(state.is_finished());
        assert_eq!(state.phase(), RoundPhase::Finished);
    }

    #[test]
    fn invariant_check_flags_out_of_range_values() {
        let mut state = GameState::new(GameConfig::default(), 11);
        state.players.me.energy = 11;
        state.players.ai.total = 0;
        let issues = state.invariant_violations();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("me energy"));
        assert!(issues[1].contains("ai total"));
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut state = GameState::new(GameConfig::default(), 77);
        state.stats.roll_counts.insert(6, 2);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        assert!(json.contains("\"mode\":\"normal\""));
    }
}
