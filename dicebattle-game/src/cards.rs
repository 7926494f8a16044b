//! Strategy cards: deck construction, gauge-driven draws, and card effects.
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    ATTACK_CARD_DAMAGE, CARD_DECK_ATTACK, CARD_DECK_BOOST, CARD_DECK_DEFENSE, CARD_DECK_RESET,
    CARD_DECK_STEAL, COST_ATTACK, COST_BOOST, COST_DEFENSE, COST_RESET, COST_STEAL, ENERGY_MAX,
    GAUGE_PER_CARD, LOG_CARD_ATTACK, LOG_CARD_DRAW, LOG_CARD_DRAW_EMPTY, LOG_CARD_PLAYED,
    LOG_CARD_STEAL, MAX_CARDS_PER_ROUND, STEAL_BASE, STEAL_SPREAD, TOTAL_MIN,
};
use crate::energy::{self, EnergyError};
use crate::rng::{DeterministicRng, shuffle};
use crate::shield::{self, EffectKind};
use crate::state::{GameState, RoundPhase, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Attack,
    Defense,
    Boost,
    Steal,
    Reset,
}

impl CardType {
    pub const ALL: &'static [Self] = &[
        Self::Attack,
        Self::Defense,
        Self::Boost,
        Self::Steal,
        Self::Reset,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Boost => "boost",
            Self::Steal => "steal",
            Self::Reset => "reset",
        }
    }

    /// Energy paid when the card is played.
    #[must_use]
    pub const fn cost(self) -> u8 {
        match self {
            Self::Attack => COST_ATTACK,
            Self::Defense => COST_DEFENSE,
            Self::Boost => COST_BOOST,
            Self::Steal => COST_STEAL,
            Self::Reset => COST_RESET,
        }
    }

    /// Phase in which the card may be played.
    #[must_use]
    pub const fn phase(self) -> RoundPhase {
        match self {
            Self::Defense | Self::Boost => RoundPhase::PreRoll,
            Self::Attack | Self::Steal | Self::Reset => RoundPhase::PostRoll,
        }
    }

    const fn deck_count(self) -> usize {
        match self {
            Self::Attack => CARD_DECK_ATTACK,
            Self::Defense => CARD_DECK_DEFENSE,
            Self::Boost => CARD_DECK_BOOST,
            Self::Steal => CARD_DECK_STEAL,
            Self::Reset => CARD_DECK_RESET,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(Self::Attack),
            "defense" => Ok(Self::Defense),
            "boost" => Ok(Self::Boost),
            "steal" => Ok(Self::Steal),
            "reset" => Ok(Self::Reset),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
}

impl Card {
    #[must_use]
    pub fn new(id: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id: id.into(),
            card_type,
        }
    }
}

/// Build the fixed 20-card strategy deck and shuffle it with the game RNG.
#[must_use]
pub fn build_deck(rng: &mut DeterministicRng) -> Vec<Card> {
    let mut deck: Vec<Card> = CardType::ALL
        .iter()
        .flat_map(|&card_type| std::iter::repeat_n(card_type, card_type.deck_count()))
        .enumerate()
        .map(|(idx, card_type)| Card::new(format!("C{}", idx + 1), card_type))
        .collect();
    shuffle(&mut deck, rng);
    deck
}

/// Draw one card into a side's hand, reshuffling the discard pile when the
/// draw pile is empty. Returns `None` when both piles are exhausted.
pub fn draw_card(state: &mut GameState, side: Side) -> Option<Card> {
    if state.decks.cards.draw.is_empty() {
        let mut recycled = std::mem::take(&mut state.decks.cards.discard);
        shuffle(&mut recycled, &mut state.rng);
        state.decks.cards.draw = recycled;
    }
    let Some(card) = state.decks.cards.draw.pop() else {
        state.push_log(LOG_CARD_DRAW_EMPTY, json!({ "side": side }));
        return None;
    };
    state.players.get_mut(side).cards.push(card.clone());
    state.push_log(
        LOG_CARD_DRAW,
        json!({ "side": side, "id": card.id, "type": card.card_type }),
    );
    Some(card)
}

/// Add to a side's gauge, drawing one card per full threshold crossed.
/// Returns the number of cards actually drawn.
pub fn add_gauge(state: &mut GameState, side: Side, delta: u32) -> usize {
    let mut gauge = state.players.get(side).gauge.saturating_add(delta);
    let mut drawn = 0;
    while gauge >= GAUGE_PER_CARD {
        gauge -= GAUGE_PER_CARD;
        if draw_card(state, side).is_some() {
            drawn += 1;
        }
    }
    state.players.get_mut(side).gauge = gauge;
    drawn
}

/// Whether the human seat may play a card of `card_type` right now.
#[must_use]
pub fn can_use_card(state: &GameState, card_type: CardType) -> bool {
    if state.is_finished() || state.phase() != card_type.phase() {
        return false;
    }
    let used = &state.round.used_cards;
    if used.len() >= MAX_CARDS_PER_ROUND || used.iter().any(|c| c.card_type == card_type) {
        return false;
    }
    state
        .players
        .me
        .cards
        .iter()
        .any(|c| c.card_type == card_type)
}

/// Play a card for the human seat. Illegal plays are silent no-ops returning
/// `Ok(false)`.
///
/// # Errors
///
/// Returns [`EnergyError::InsufficientEnergy`] when the card's cost cannot be
/// paid; the hand and round are left untouched in that case.
pub fn use_card(state: &mut GameState, card_type: CardType) -> Result<bool, EnergyError> {
    if !can_use_card(state, card_type) {
        log::debug!("ignoring illegal {card_type} card play");
        return Ok(false);
    }
    energy::spend(state, Side::Me, card_type.cost())?;

    let hand = &mut state.players.me.cards;
    let Some(pos) = hand.iter().position(|c| c.card_type == card_type) else {
        return Ok(false);
    };
    let card = hand.remove(pos);
    state.push_log(
        LOG_CARD_PLAYED,
        json!({ "id": card.id, "type": card_type, "cost": card_type.cost() }),
    );
    state.round.used_cards.push(card);

    match card_type {
        CardType::Defense => {
            shield::add(state, Side::Me, 1);
        }
        CardType::Boost => state.round.boost_active = true,
        CardType::Reset => {
            state.round.temp_score = 0;
            state.round.boost_active = false;
        }
        CardType::Attack => play_attack(state, Side::Me),
        CardType::Steal => play_steal(state, Side::Me),
    }
    Ok(true)
}

fn play_attack(state: &mut GameState, attacker: Side) {
    let target = attacker.opponent();
    let blocked = shield::consume(state, target, EffectKind::AttackCard);
    if !blocked {
        let victim = state.players.get_mut(target);
        victim.total = (victim.total - ATTACK_CARD_DAMAGE).max(TOTAL_MIN);
    }
    state.push_log(
        LOG_CARD_ATTACK,
        json!({ "target": target, "amount": ATTACK_CARD_DAMAGE, "blocked": blocked }),
    );
}

fn play_steal(state: &mut GameState, thief: Side) {
    let target = thief.opponent();
    if shield::consume(state, target, EffectKind::StealCard) {
        state.push_log(
            LOG_CARD_STEAL,
            json!({ "from": target, "amount": 0, "blocked": true }),
        );
        return;
    }
    let rolled = STEAL_BASE + u8::try_from(state.rng.below(STEAL_SPREAD)).unwrap_or(0);
    let room = ENERGY_MAX.saturating_sub(state.players.get(thief).energy);
    let take = rolled.min(state.players.get(target).energy).min(room);
    let victim = state.players.get_mut(target);
    victim.energy -= take;
    energy::gain(state, thief, take);
    state.push_log(
        LOG_CARD_STEAL,
        json!({ "from": target, "amount": take, "blocked": false }),
    );
}
