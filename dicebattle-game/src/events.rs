//! Event deck: category cards expanded to concrete events at draw time.
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::constants::{
    BOMB_FLOOR, CURSE_EVENT_PENALTY, EVENT_DECK_NEGATIVE, EVENT_DECK_NEUTRAL, EVENT_DECK_NONE,
    EVENT_DECK_POSITIVE, LOG_EVENT_DRAWN, LOG_EVENT_EMPTY, SCORE_BOOST_AMOUNT, SWAP_MIN_DIFF,
    THIEF_AMOUNT, THIEF_MIN_TOTAL, TOTAL_MIN,
};
use crate::energy::{self, EnergyEvent};
use crate::rng::{DeterministicRng, shuffle};
use crate::shield::{self, EffectKind};
use crate::state::{GameState, Side};

const EMPTY_EVENT_ID: &str = "E0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    None,
    Positive,
    Negative,
    Neutral,
}

impl EventCategory {
    pub const ALL: &'static [Self] = &[Self::None, Self::Positive, Self::Negative, Self::Neutral];

    /// Concrete events a category card can turn into.
    #[must_use]
    pub const fn pool(self) -> &'static [EventType] {
        match self {
            Self::None => &[EventType::None],
            Self::Positive => &[
                EventType::Lucky,
                EventType::ScoreBoost,
                EventType::BonusTurn,
                EventType::EnergyCharge,
            ],
            Self::Negative => &[
                EventType::Bomb,
                EventType::Thief,
                EventType::Curse,
                EventType::EnergyDrain,
            ],
            Self::Neutral => &[
                EventType::ScoreSwap,
                EventType::Reset,
                EventType::CardExchange,
                EventType::None,
            ],
        }
    }

    const fn deck_count(self) -> usize {
        match self {
            Self::None => EVENT_DECK_NONE,
            Self::Positive => EVENT_DECK_POSITIVE,
            Self::Negative => EVENT_DECK_NEGATIVE,
            Self::Neutral => EVENT_DECK_NEUTRAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    None,
    Lucky,
    ScoreBoost,
    BonusTurn,
    EnergyCharge,
    Bomb,
    Thief,
    Curse,
    EnergyDrain,
    ScoreSwap,
    Reset,
    CardExchange,
}

impl EventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Lucky => "lucky",
            Self::ScoreBoost => "score_boost",
            Self::BonusTurn => "bonus_turn",
            Self::EnergyCharge => "energy_charge",
            Self::Bomb => "bomb",
            Self::Thief => "thief",
            Self::Curse => "curse",
            Self::EnergyDrain => "energy_drain",
            Self::ScoreSwap => "score_swap",
            Self::Reset => "reset",
            Self::CardExchange => "card_exchange",
        }
    }

    /// Delayed events write into the schedule and fire next round.
    #[must_use]
    pub const fn is_delayed(self) -> bool {
        matches!(self, Self::Lucky | Self::BonusTurn | Self::Curse)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A card in the event deck. Once drawn it is discarded with the concrete
/// event it expanded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCard {
    pub id: String,
    #[serde(rename = "kind")]
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked: Option<EventType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
}

/// Build the 20-card event deck and shuffle it with the game RNG.
#[must_use]
pub fn build_event_deck(rng: &mut DeterministicRng) -> Vec<EventCard> {
    let mut deck: Vec<EventCard> = EventCategory::ALL
        .iter()
        .flat_map(|&category| std::iter::repeat_n(category, category.deck_count()))
        .enumerate()
        .map(|(idx, category)| EventCard {
            id: format!("E{}", idx + 1),
            category,
            picked: None,
        })
        .collect();
    shuffle(&mut deck, rng);
    deck
}

/// Pop the next category card (reshuffling the discard when needed) and
/// expand it to a concrete event. With both piles empty a synthetic `none`
/// event is returned and no randomness is consumed.
pub fn draw_event(state: &mut GameState) -> DrawnEvent {
    if state.decks.events.draw.is_empty() {
        let mut recycled = std::mem::take(&mut state.decks.events.discard);
        for card in &mut recycled {
            card.picked = None;
        }
        shuffle(&mut recycled, &mut state.rng);
        state.decks.events.draw = recycled;
    }
    let Some(mut card) = state.decks.events.draw.pop() else {
        state.push_log(LOG_EVENT_EMPTY, json!({ "id": EMPTY_EVENT_ID }));
        return DrawnEvent {
            id: EMPTY_EVENT_ID.to_string(),
            event_type: EventType::None,
        };
    };
    let pool = card.category.pool();
    let event_type = pool[state.rng.pick_index(pool.len())];
    log::trace!("event {} ({:?}) expanded to {event_type}", card.id, card.category);
    card.picked = Some(event_type);
    let drawn = DrawnEvent {
        id: card.id.clone(),
        event_type,
    };
    state.decks.events.discard.push(card);
    drawn
}

/// Apply an event on behalf of the side that drew it.
pub fn apply_event(state: &mut GameState, event: &DrawnEvent, side: Side) {
    state.push_log(
        LOG_EVENT_DRAWN,
        json!({ "side": side, "id": event.id, "type": event.event_type }),
    );
    match event.event_type {
        EventType::None => {}
        EventType::Lucky => state.scheduled.luck_next = true,
        EventType::BonusTurn => state.scheduled.bonus_turn_next = true,
        EventType::Curse => state.scheduled.curse_next += CURSE_EVENT_PENALTY,
        EventType::ScoreBoost => match side {
            Side::Me => state.round.score_boost += SCORE_BOOST_AMOUNT,
            Side::Ai => state.round.score_boost_ai += SCORE_BOOST_AMOUNT,
        },
        EventType::EnergyCharge => {
            energy::apply_energy_event(state, side, EnergyEvent::Charge);
        }
        EventType::EnergyDrain => {
            energy::apply_energy_event(state, side, EnergyEvent::Drain);
        }
        EventType::Bomb => {
            if !shield::consume(state, side, EffectKind::BombEvent) {
                let player = state.players.get_mut(side);
                player.total = (player.total / 2).max(BOMB_FLOOR);
            }
        }
        EventType::Thief => apply_thief(state, side),
        EventType::Reset => match side {
            Side::Me => {
                state.round.temp_score = 0;
                state.round.current_score = 0;
            }
            Side::Ai => state.round.current_scores.ai = 0,
        },
        EventType::ScoreSwap => {
            let players = &mut state.players;
            if (players.me.total - players.ai.total).abs() >= SWAP_MIN_DIFF {
                std::mem::swap(&mut players.me.total, &mut players.ai.total);
            }
        }
        EventType::CardExchange => apply_card_exchange(state),
    }
}

fn apply_thief(state: &mut GameState, victim: Side) {
    if shield::absorb(state, victim) {
        return;
    }
    if state.players.get(victim).total < THIEF_MIN_TOTAL {
        return;
    }
    let loser = state.players.get_mut(victim);
    loser.total = (loser.total - THIEF_AMOUNT).max(TOTAL_MIN);
    state.players.get_mut(victim.opponent()).total += THIEF_AMOUNT;
}

fn apply_card_exchange(state: &mut GameState) {
    let me_len = state.players.me.cards.len();
    let ai_len = state.players.ai.cards.len();
    if me_len == 0 || ai_len == 0 {
        return;
    }
    let mi = state.rng.pick_index(me_len);
    let ai = state.rng.pick_index(ai_len);
    let players = &mut state.players;
    std::mem::swap(&mut players.me.cards[mi], &mut players.ai.cards[ai]);
}
