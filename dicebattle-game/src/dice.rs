//! Dice resolution: tendency scoring and the secondary special roll.
use serde::{Deserialize, Serialize};

use crate::constants::{
    ATTACK_FAIL_SCORE, ATTACK_SIX_BONUS, ATTACK_SUCCESS_MIN, DEFENSE_SUCCESS_MAX,
    DEFENSE_SUCCESS_MIN, DIE_FACES,
};
use crate::rng::DeterministicRng;
use crate::state::Tendency;

/// Roll one six-sided die.
pub fn roll_dice(rng: &mut DeterministicRng) -> u8 {
    u8::try_from(rng.roll(DIE_FACES)).unwrap_or(1)
}

/// Extra reward attached to a tendency outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TendencyBonus {
    /// Attack rolled a six.
    Plus { amount: i32 },
    /// Successful defense.
    Shield { amount: u8 },
    /// Balance always pays out energy and gauge; the engine grants these
    /// before rolling.
    EnergyGauge { energy: u8, gauge: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TendencyResult {
    pub success: bool,
    pub base_score: i32,
    pub bonus: Option<TendencyBonus>,
}

impl TendencyResult {
    /// Base score plus any flat bonus.
    #[must_use]
    pub const fn score(&self) -> i32 {
        match self.bonus {
            Some(TendencyBonus::Plus { amount }) => self.base_score + amount,
            _ => self.base_score,
        }
    }

    /// Shields granted by the outcome.
    #[must_use]
    pub const fn shields(&self) -> u8 {
        match self.bonus {
            Some(TendencyBonus::Shield { amount }) => amount,
            _ => 0,
        }
    }
}

#[must_use]
pub fn resolve_tendency(tendency: Tendency, roll: u8) -> TendencyResult {
    let face = i32::from(roll);
    match tendency {
        Tendency::Attack => {
            let success = roll >= ATTACK_SUCCESS_MIN;
            TendencyResult {
                success,
                base_score: if success { face } else { ATTACK_FAIL_SCORE },
                bonus: (u32::from(roll) == DIE_FACES).then_some(TendencyBonus::Plus {
                    amount: ATTACK_SIX_BONUS,
                }),
            }
        }
        Tendency::Defense => {
            let success = (DEFENSE_SUCCESS_MIN..=DEFENSE_SUCCESS_MAX).contains(&roll);
            TendencyResult {
                success,
                base_score: if success { face } else { 0 },
                bonus: success.then_some(TendencyBonus::Shield { amount: 1 }),
            }
        }
        Tendency::Balance => TendencyResult {
            success: true,
            base_score: face,
            bonus: Some(TendencyBonus::EnergyGauge {
                energy: 1,
                gauge: 1,
            }),
        },
    }
}

/// Narrative side effect of a special roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Special {
    /// ⚡ blockable -2.
    Lightning,
    /// 🔥 blockable -3 now, unblockable curse next round.
    Flame,
    /// 🎯 doubles the score.
    Target,
    /// 🛡️ +1 shield.
    Shield,
    /// ⭐ +2..6 score.
    Star,
}

impl Special {
    const ATTACK: [Self; 3] = [Self::Lightning, Self::Flame, Self::Target];
    const DEFENSE: [Self; 2] = [Self::Shield, Self::Star];

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Lightning => "⚡",
            Self::Flame => "🔥",
            Self::Target => "🎯",
            Self::Shield => "🛡️",
            Self::Star => "⭐",
        }
    }
}

/// Roll for a special. Only an attack six and a defense two qualify; every
/// other combination leaves the RNG untouched.
pub fn resolve_special(tendency: Tendency, roll: u8, rng: &mut DeterministicRng) -> Option<Special> {
    match (tendency, roll) {
        (Tendency::Attack, 6) => Some(Special::ATTACK[rng.pick_index(Special::ATTACK.len())]),
        (Tendency::Defense, 2) => Some(Special::DEFENSE[rng.pick_index(Special::DEFENSE.len())]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_scoring() {
        let miss = resolve_tendency(Tendency::Attack, 3);
        assert!(!miss.success);
        assert_eq!(miss.score(), 1);
        let hit = resolve_tendency(Tendency::Attack, 4);
        assert_eq!(hit.score(), 4);
        assert_eq!(hit.bonus, None);
        let six = resolve_tendency(Tendency::Attack, 6);
        assert_eq!(six.base_score, 6);
        assert_eq!(six.score(), 9);
    }

    #[test]
    fn defense_scoring() {
        for roll in [1, 6] {
            let res = resolve_tendency(Tendency::Defense, roll);
            assert!(!res.success);
            assert_eq!(res.score(), 0);
            assert_eq!(res.shields(), 0);
        }
        for roll in 2..=5 {
            let res = resolve_tendency(Tendency::Defense, roll);
            assert_eq!(res.score(), i32::from(roll));
            assert_eq!(res.shields(), 1);
        }
    }

    #[test]
    fn balance_always_succeeds() {
        for roll in 1..=6 {
            let res = resolve_tendency(Tendency::Balance, roll);
            assert!(res.success);
            assert_eq!(res.score(), i32::from(roll));
        }
    }

    #[test]
    fn specials_only_on_qualifying_rolls() {
        let mut rng = DeterministicRng::new(3);
        assert_eq!(resolve_special(Tendency::Attack, 5, &mut rng), None);
        assert_eq!(resolve_special(Tendency::Defense, 3, &mut rng), None);
        assert_eq!(resolve_special(Tendency::Balance, 6, &mut rng), None);
        assert_eq!(rng.draws(), 0);

        for _ in 0..50 {
            let attack = resolve_special(Tendency::Attack, 6, &mut rng);
            assert!(matches!(
                attack,
                Some(Special::Lightning | Special::Flame | Special::Target)
            ));
            let defense = resolve_special(Tendency::Defense, 2, &mut rng);
            assert!(matches!(defense, Some(Special::Shield | Special::Star)));
        }
        assert_eq!(rng.draws(), 100);
    }
}
