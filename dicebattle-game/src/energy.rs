//! Energy ledger: saturating gains, checked spends, and event step functions.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CHARGE_FULL_CEILING, CHARGE_FULL_STEP, CHARGE_PARTIAL_CEILING, CHARGE_PARTIAL_STEP,
    DRAIN_AMOUNT, DRAIN_FLOOR, DRAIN_THRESHOLD, ENERGY_MAX,
};
use crate::state::{GameState, Side};

/// Hard failure raised when a side tries to spend more energy than it holds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EnergyError {
    #[error("{side} needs {need} energy but only has {have}")]
    InsufficientEnergy { side: Side, need: u8, have: u8 },
}

/// Energy-affecting event kinds shared by cards and drawn events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyEvent {
    Charge,
    Drain,
}

/// Add energy, saturating at the cap. Returns the new energy level.
pub fn gain(state: &mut GameState, side: Side, amount: u8) -> u8 {
    let player = state.players.get_mut(side);
    player.energy = player.energy.saturating_add(amount).min(ENERGY_MAX);
    player.energy
}

/// Spend energy, failing without side effects when the balance is too low.
///
/// # Errors
///
/// Returns [`EnergyError::InsufficientEnergy`] when `amount` exceeds the
/// side's current energy.
pub fn spend(state: &mut GameState, side: Side, amount: u8) -> Result<u8, EnergyError> {
    let player = state.players.get_mut(side);
    let Some(after) = player.energy.checked_sub(amount) else {
        return Err(EnergyError::InsufficientEnergy {
            side,
            need: amount,
            have: player.energy,
        });
    };
    player.energy = after;
    Ok(after)
}

/// Step function used by energy charge: +3 up to 7, +2 up to 9, nothing at 10.
#[must_use]
pub const fn charge_delta(current: u8) -> u8 {
    if current <= CHARGE_FULL_CEILING {
        CHARGE_FULL_STEP
    } else if current <= CHARGE_PARTIAL_CEILING {
        CHARGE_PARTIAL_STEP
    } else {
        0
    }
}

/// Apply a charge or drain to one side. Returns the new energy level.
pub fn apply_energy_event(state: &mut GameState, side: Side, kind: EnergyEvent) -> u8 {
    match kind {
        EnergyEvent::Charge => {
            let delta = charge_delta(state.players.get(side).energy);
            gain(state, side, delta)
        }
        EnergyEvent::Drain => {
            let player = state.players.get_mut(side);
            if player.energy >= DRAIN_THRESHOLD {
                player.energy = player.energy.saturating_sub(DRAIN_AMOUNT).max(DRAIN_FLOOR);
            }
            player.energy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GameConfig, GameState};

    fn fresh() -> GameState {
        GameState::new(GameConfig::default(), 42)
    }

    #[test]
    fn gain_saturates_at_cap() {
        let mut state = fresh();
        assert_eq!(gain(&mut state, Side::Me, 7), 7);
        assert_eq!(gain(&mut state, Side::Me, 7), ENERGY_MAX);
        assert_eq!(state.players.ai.energy, 0);
    }

    #[test]
    fn spend_reports_overdraft_and_leaves_state() {
        let mut state = fresh();
        state.players.me.energy = 1;
        let err = spend(&mut state, Side::Me, 2).unwrap_err();
        assert_eq!(
            err,
            EnergyError::InsufficientEnergy {
                side: Side::Me,
                need: 2,
                have: 1
            }
        );
        assert_eq!(state.players.me.energy, 1);
        assert_eq!(spend(&mut state, Side::Me, 1), Ok(0));
    }

    #[test]
    fn charge_follows_step_function() {
        let mut state = fresh();
        for (start, expected) in [(0, 3), (7, 10), (8, 10), (9, 10), (10, 10)] {
            state.players.ai.energy = start;
            assert_eq!(
                apply_energy_event(&mut state, Side::Ai, EnergyEvent::Charge),
                expected
            );
        }
    }

    #[test]
    fn drain_only_fires_from_three() {
        let mut state = fresh();
        for (start, expected) in [(2, 2), (3, 1), (4, 2), (10, 8)] {
            state.players.me.energy = start;
            assert_eq!(
                apply_energy_event(&mut state, Side::Me, EnergyEvent::Drain),
                expected
            );
        }
    }
}
