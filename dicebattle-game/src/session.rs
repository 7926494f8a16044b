//! Checked wrapper that owns one game and reports phase misuse as errors.
use thiserror::Error;

use crate::cards::{self, CardType};
use crate::energy::EnergyError;
use crate::engine;
use crate::observer::PhaseObserver;
use crate::result::{self, GameOutcome};
use crate::state::{GameConfig, GameState, RoundPhase, Tendency, normalize_seed};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} during the {phase:?} phase")]
    WrongPhase {
        action: &'static str,
        phase: RoundPhase,
    },
    #[error("game is over after {rounds} rounds")]
    GameOver { rounds: u32 },
    #[error(transparent)]
    Energy(#[from] EnergyError),
}

/// Owns one game and the observers that follow it. Unlike the raw engine,
/// misuse is reported instead of ignored.
pub struct BattleSession {
    state: GameState,
    observers: Vec<Box<dyn PhaseObserver>>,
}

impl BattleSession {
    /// Start a game, normalising the configuration and seed first.
    #[must_use]
    pub fn new(config: GameConfig, seed: u32) -> Self {
        Self::from_state(GameState::new(config.normalized(), normalize_seed(seed)))
    }

    /// Wrap an existing state, e.g. one restored from JSON.
    #[must_use]
    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            observers: Vec::new(),
        }
    }

    /// Register an observer for phase notifications.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn PhaseObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    fn expect_phase(&self, action: &'static str, wanted: RoundPhase) -> Result<(), SessionError> {
        match self.state.phase() {
            RoundPhase::Finished => Err(SessionError::GameOver {
                rounds: self.state.config.rounds,
            }),
            phase if phase == wanted => Ok(()),
            phase => Err(SessionError::WrongPhase { action, phase }),
        }
    }

    /// Roll for both seats.
    ///
    /// # Errors
    ///
    /// Fails when the round has already been rolled or the game is over.
    pub fn start_round(&mut self, me: Tendency, ai: Tendency) -> Result<(), SessionError> {
        self.expect_phase("start a round", RoundPhase::PreRoll)?;
        engine::start_round(&mut self.state, me, &mut self.observers);
        engine::start_round_ai(&mut self.state, ai, &mut self.observers);
        Ok(())
    }

    /// Play a card for the human seat. Returns `Ok(false)` when the card is
    /// not playable right now.
    ///
    /// # Errors
    ///
    /// Fails when the game is over or the card cannot be paid for.
    pub fn use_card(&mut self, card_type: CardType) -> Result<bool, SessionError> {
        if self.state.is_finished() {
            return Err(SessionError::GameOver {
                rounds: self.state.config.rounds,
            });
        }
        Ok(cards::use_card(&mut self.state, card_type)?)
    }

    /// Close the current round.
    ///
    /// # Errors
    ///
    /// Fails before rolling or once the game is over.
    pub fn finalize_round(&mut self) -> Result<(), SessionError> {
        self.expect_phase("finalize a round", RoundPhase::PostRoll)?;
        engine::finalize_round(&mut self.state, &mut self.observers);
        Ok(())
    }

    /// Roll and finalize in one step.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start_round`].
    pub fn run_round(&mut self, me: Tendency, ai: Tendency) -> Result<(), SessionError> {
        self.start_round(me, ai)?;
        self.finalize_round()
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<GameOutcome> {
        result::outcome(&self.state)
    }

    /// Consume the session, returning the underlying game state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use crate::state::GameMode;

    #[test]
    fn session_normalises_inputs() {
        let session = BattleSession::new(GameConfig::for_mode(GameMode::Quick).with_rounds(0), 0);
        assert_eq!(session.state().config.rounds, 8);
        assert_eq!(session.state().log[0].payload["seed"], 123_456);
    }

    #[test]
    fn misuse_is_reported() {
        let mut session = BattleSession::new(GameConfig::default().with_rounds(1), 9);
        assert_eq!(
            session.finalize_round(),
            Err(SessionError::WrongPhase {
                action: "finalize a round",
                phase: RoundPhase::PreRoll
            })
        );
        session
            .start_round(Tendency::Attack, Tendency::Defense)
            .unwrap();
        assert!(matches!(
            session.start_round(Tendency::Attack, Tendency::Defense),
            Err(SessionError::WrongPhase { .. })
        ));
        session.finalize_round().unwrap();
        assert!(session.is_finished());
        assert_eq!(
            session.run_round(Tendency::Balance, Tendency::Balance),
            Err(SessionError::GameOver { rounds: 1 })
        );
        assert!(session.outcome().is_some());
    }

    #[test]
    fn energy_errors_surface_through_the_session() {
        let mut state = GameState::new(GameConfig::default(), 3);
        state.players.me.cards.push(Card::new("X", CardType::Boost));
        let mut session = BattleSession::from_state(state);
        assert!(matches!(
            session.use_card(CardType::Boost),
            Err(SessionError::Energy(EnergyError::InsufficientEnergy { need: 4, .. }))
        ));
    }

    #[test]
    fn observers_are_notified() {
        use crate::observer::{Phase, PhaseEvent};
        use std::sync::{Arc, Mutex};

        struct Shared(Arc<Mutex<Vec<PhaseEvent>>>);
        impl PhaseObserver for Shared {
            fn on_phase(&mut self, event: PhaseEvent) {
                if let Ok(mut seen) = self.0.lock() {
                    seen.push(event);
                }
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut session = BattleSession::new(GameConfig::default().with_rounds(2), 15)
            .with_observer(Box::new(Shared(Arc::clone(&seen))));
        session.run_round(Tendency::Balance, Tendency::Attack).unwrap();
        let phases: Vec<Phase> = seen.lock().unwrap().iter().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            vec![Phase::RoundStart, Phase::RoundStartAi, Phase::RoundEnd]
        );
    }
}
