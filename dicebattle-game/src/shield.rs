//! Shield ledger. Every damage or steal source asks [`consume`] before it
//! lands; only the whitelisted effect kinds can actually be blocked.
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::{LOG_SHIELD_CREATED, SHIELD_CREATE_COST, SHIELD_MAX};
use crate::energy::{self, EnergyError};
use crate::state::{GameState, Side};

/// Tagged source of damage or theft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    /// Attack card played by the opponent.
    AttackCard,
    /// Lightning special on an attack six.
    AttackDie,
    /// Immediate part of the flame special.
    FlameDieNow,
    /// Carry-over part of the flame special.
    FlameDieNext,
    /// Steal card played by the opponent.
    StealCard,
    /// Bomb event.
    BombEvent,
}

impl EffectKind {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::AttackCard => "attack-card",
            Self::AttackDie => "attack-die",
            Self::FlameDieNow => "flame-die-now",
            Self::FlameDieNext => "flame-die-next",
            Self::StealCard => "steal-card",
            Self::BombEvent => "bomb-event",
        }
    }
}

/// Whether a shield can cancel the given effect.
#[must_use]
pub const fn can_block(kind: EffectKind) -> bool {
    matches!(
        kind,
        EffectKind::AttackCard
            | EffectKind::AttackDie
            | EffectKind::FlameDieNow
            | EffectKind::StealCard
    )
}

/// Add shields, saturating at the cap. Returns the new count.
pub fn add(state: &mut GameState, side: Side, n: u8) -> u8 {
    let player = state.players.get_mut(side);
    player.shields = player.shields.saturating_add(n).min(SHIELD_MAX);
    player.shields
}

/// Spend one shield if the side has any. Returns true when a shield was used.
pub(crate) fn absorb(state: &mut GameState, side: Side) -> bool {
    let player = state.players.get_mut(side);
    if player.shields == 0 {
        return false;
    }
    player.shields -= 1;
    true
}

/// Try to block an incoming effect. Returns true when it was blocked.
pub fn consume(state: &mut GameState, side: Side, kind: EffectKind) -> bool {
    if !can_block(kind) {
        return false;
    }
    let blocked = absorb(state, side);
    log::trace!("{side} shield check for {}: blocked={blocked}", kind.key());
    blocked
}

/// Buy a shield for energy. At the cap this is a silent no-op returning
/// `Ok(false)`.
///
/// # Errors
///
/// Returns [`EnergyError::InsufficientEnergy`] when the side cannot pay.
pub fn create_shield(state: &mut GameState, side: Side) -> Result<bool, EnergyError> {
    if state.players.get(side).shields >= SHIELD_MAX {
        return Ok(false);
    }
    energy::spend(state, side, SHIELD_CREATE_COST)?;
    let shields = add(state, side, 1);
    state.push_log(
        LOG_SHIELD_CREATED,
        json!({ "side": side, "shields": shields, "cost": SHIELD_CREATE_COST }),
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameConfig;

    fn fresh() -> GameState {
        GameState::new(GameConfig::default(), 9)
    }

    #[test]
    fn whitelist_is_fixed() {
        assert!(can_block(EffectKind::AttackCard));
        assert!(can_block(EffectKind::AttackDie));
        assert!(can_block(EffectKind::FlameDieNow));
        assert!(can_block(EffectKind::StealCard));
        assert!(!can_block(EffectKind::FlameDieNext));
        assert!(!can_block(EffectKind::BombEvent));
    }

    #[test]
    fn consume_uses_one_shield_for_blockable_effects() {
        let mut state = fresh();
        state.players.me.shields = 2;
        assert!(consume(&mut state, Side::Me, EffectKind::AttackDie));
        assert_eq!(state.players.me.shields, 1);
        assert!(!consume(&mut state, Side::Me, EffectKind::BombEvent));
        assert_eq!(state.players.me.shields, 1);
        assert!(consume(&mut state, Side::Me, EffectKind::StealCard));
        assert!(!consume(&mut state, Side::Me, EffectKind::StealCard));
        assert_eq!(state.players.me.shields, 0);
    }

    #[test]
    fn add_caps_at_two() {
        let mut state = fresh();
        assert_eq!(add(&mut state, Side::Ai, 5), SHIELD_MAX);
    }

    #[test]
    fn create_shield_spends_energy_and_respects_cap() {
        let mut state = fresh();
        state.players.me.energy = 7;
        assert_eq!(create_shield(&mut state, Side::Me), Ok(true));
        assert_eq!(create_shield(&mut state, Side::Me), Ok(true));
        assert_eq!(state.players.me.energy, 1);
        assert_eq!(create_shield(&mut state, Side::Me), Ok(false));
        assert_eq!(state.players.me.energy, 1);
    }

    #[test]
    fn create_shield_reports_overdraft() {
        let mut state = fresh();
        state.players.ai.energy = 2;
        assert!(create_shield(&mut state, Side::Ai).is_err());
        assert_eq!(state.players.ai.shields, 0);
        assert_eq!(state.players.ai.energy, 2);
    }
}
