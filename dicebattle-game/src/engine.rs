//! Round engine: pre-roll bonuses, rolls, specials, scheduled effects,
//! event draws, scoring and streaks.
//!
//! Every entry point mutates the single [`GameState`] in place and consumes
//! the shared RNG in a fixed order: main die, lucky reroll, special, bonus
//! die, bonus special, then the two event draws at finalize. Calls made in
//! the wrong phase are ignored.
use serde_json::json;

use crate::cards;
use crate::constants::{
    BALANCE_ENERGY_BONUS, CONSECUTIVE_SIX_THRESHOLD, FLAME_CURSE, FLAME_PENALTY, GAUGE_PER_CARD,
    HIGH_SCORE_GAUGE_THRESHOLD, LIGHTNING_PENALTY, LOG_BONUS_ROLL, LOG_CURSE_APPLIED,
    LOG_GAUGE_FREE_DRAW, LOG_LUCKY_REROLL, LOG_ROUND_END, LOG_ROUND_ROLL, LOG_ROUND_ROLL_AI,
    LOG_SCORE_FINAL, LOG_SPECIAL, LOG_SPECIAL_AI, LOSS_STREAK_GAUGE, REPEAT_FACE_THRESHOLD,
    ROUND_ENERGY_AFTER_LOSS, ROUND_ENERGY_BASE, STAR_BONUS_BASE, STAR_BONUS_SPREAD, TOTAL_MIN,
    WIN_STREAK_GAUGE, WINNER_ENERGY_BONUS,
};
use crate::dice::{self, Special};
use crate::energy;
use crate::events;
use crate::observer::{Phase, PhaseEvent, PhaseObserver};
use crate::shield::{self, EffectKind};
use crate::state::{GameState, RoundPhase, Side, Tendency};

fn notify<O: PhaseObserver + ?Sized>(observer: &mut O, phase: Phase, round: u32) {
    observer.on_phase(PhaseEvent { phase, round });
}

/// Energy granted at the start of a side's half-round.
fn round_energy(state: &GameState, side: Side) -> u8 {
    match state.stats.last_winner {
        Some(winner) if winner != side => ROUND_ENERGY_AFTER_LOSS,
        _ => ROUND_ENERGY_BASE,
    }
}

/// Score a single die for `side`, applying the tendency bonus and any
/// special. Flame schedules a curse only for the human seat.
fn score_roll(state: &mut GameState, side: Side, tendency: Tendency, roll: u8) -> i32 {
    let outcome = dice::resolve_tendency(tendency, roll);
    let mut score = outcome.score();
    if outcome.shields() > 0 {
        shield::add(state, side, outcome.shields());
    }

    let Some(special) = dice::resolve_special(tendency, roll, &mut state.rng) else {
        return score;
    };
    let mut blocked = false;
    match special {
        Special::Lightning => {
            blocked = shield::consume(state, side, EffectKind::AttackDie);
            if !blocked {
                score = (score - LIGHTNING_PENALTY).max(0);
            }
        }
        Special::Flame => {
            blocked = shield::consume(state, side, EffectKind::FlameDieNow);
            if !blocked {
                score = (score - FLAME_PENALTY).max(0);
            }
            if side == Side::Me {
                state.scheduled.curse_next += FLAME_CURSE;
            }
        }
        Special::Target => score *= 2,
        Special::Shield => {
            shield::add(state, side, 1);
        }
        Special::Star => {
            let spread = i32::try_from(state.rng.below(STAR_BONUS_SPREAD)).unwrap_or(0);
            score += STAR_BONUS_BASE + spread;
        }
    }
    let tag = match side {
        Side::Me => LOG_SPECIAL,
        Side::Ai => LOG_SPECIAL_AI,
    };
    state.push_log(
        tag,
        json!({ "symbol": special.symbol(), "roll": roll, "blocked": blocked }),
    );
    score
}

/// Open the human seat's round: pre-roll bonuses, scheduled effects, the
/// roll, specials, boost, bonus turn and gauge triggers.
pub fn start_round<O: PhaseObserver + ?Sized>(
    state: &mut GameState,
    tendency: Tendency,
    observer: &mut O,
) {
    if state.phase() != RoundPhase::PreRoll {
        log::warn!("start_round ignored in {:?} phase", state.phase());
        return;
    }
    let index = state.round.index;
    notify(observer, Phase::RoundStart, index);
    log::debug!("round {index} start: me plays {tendency}");

    if tendency == Tendency::Balance {
        energy::gain(state, Side::Me, BALANCE_ENERGY_BONUS);
        cards::add_gauge(state, Side::Me, 1);
    }
    let base = round_energy(state, Side::Me);
    energy::gain(state, Side::Me, base);

    let curse = state.scheduled.curse_next;
    if curse > 0 {
        let penalty = i32::try_from(curse).unwrap_or(i32::MAX);
        state.round.temp_score = state.round.temp_score.saturating_sub(penalty).max(0);
        state.scheduled.curse_next = 0;
        state.push_log(LOG_CURSE_APPLIED, json!({ "amount": curse }));
    }

    let mut roll = dice::roll_dice(&mut state.rng);
    if state.scheduled.luck_next {
        let reroll = dice::roll_dice(&mut state.rng);
        state.push_log(LOG_LUCKY_REROLL, json!({ "first": roll, "second": reroll }));
        roll = roll.max(reroll);
        state.scheduled.luck_next = false;
    }
    state.round.tendency = Some(tendency);
    state.round.roll = Some(roll);
    state.round.roll_me = Some(roll);
    *state.stats.roll_counts.entry(roll).or_insert(0) += 1;
    state.stats.consec_six = if roll == 6 {
        state.stats.consec_six + 1
    } else {
        0
    };
    state.push_log(
        LOG_ROUND_ROLL,
        json!({ "index": index, "tendency": tendency, "roll": roll }),
    );

    let mut score = score_roll(state, Side::Me, tendency, roll);
    if state.round.boost_active {
        score *= 2;
    }

    if state.scheduled.bonus_turn_next {
        let bonus_roll = dice::roll_dice(&mut state.rng);
        let mut extra = score_roll(state, Side::Me, tendency, bonus_roll);
        if state.round.boost_active {
            extra *= 2;
        }
        score += extra;
        state.push_log(LOG_BONUS_ROLL, json!({ "value": bonus_roll, "score": extra }));
        state.scheduled.bonus_turn_next = false;
    }

    let repeats = state.stats.roll_counts.get(&roll).copied().unwrap_or(0);
    if repeats >= REPEAT_FACE_THRESHOLD {
        cards::add_gauge(state, Side::Me, 1);
    }
    if state.stats.consec_six >= CONSECUTIVE_SIX_THRESHOLD {
        let before = state.players.me.gauge;
        let drawn = cards::add_gauge(state, Side::Me, GAUGE_PER_CARD);
        state.players.me.gauge = before;
        state.stats.consec_six = 0;
        state.push_log(LOG_GAUGE_FREE_DRAW, json!({ "drawn": drawn }));
    }
    if score >= HIGH_SCORE_GAUGE_THRESHOLD {
        cards::add_gauge(state, Side::Me, 1);
    }

    let score = score.max(0);
    state.round.current_score = score;
    state.round.current_scores.me = score;
    log::debug!("round {index} me rolled {roll} for {score}");
}

/// Play the opponent's half-round: balance bonus, base energy, roll,
/// specials against its own shields, and the high-score gauge trigger.
/// Cards, boost and scheduled effects do not apply to this seat.
pub fn start_round_ai<O: PhaseObserver + ?Sized>(
    state: &mut GameState,
    tendency: Tendency,
    observer: &mut O,
) {
    if state.is_finished() || state.round.roll_ai.is_some() {
        log::warn!("start_round_ai ignored (phase {:?})", state.phase());
        return;
    }
    let index = state.round.index;
    notify(observer, Phase::RoundStartAi, index);

    if tendency == Tendency::Balance {
        energy::gain(state, Side::Ai, BALANCE_ENERGY_BONUS);
        cards::add_gauge(state, Side::Ai, 1);
    }
    let base = round_energy(state, Side::Ai);
    energy::gain(state, Side::Ai, base);

    let roll = dice::roll_dice(&mut state.rng);
    state.round.roll_ai = Some(roll);
    state.push_log(
        LOG_ROUND_ROLL_AI,
        json!({ "index": index, "tendency": tendency, "roll": roll }),
    );
    let score = score_roll(state, Side::Ai, tendency, roll);
    if score >= HIGH_SCORE_GAUGE_THRESHOLD {
        cards::add_gauge(state, Side::Ai, 1);
    }
    state.round.current_scores.ai = score.max(0);
    log::debug!("round {index} ai rolled {roll} for {}", score.max(0));
}

fn record_winner(state: &mut GameState, winner: Option<Side>) {
    state.stats.last_winner = winner;
    let stats = &mut state.stats;
    match winner {
        Some(Side::Me) => {
            stats.win_streak_me += 1;
            stats.loss_streak_me = 0;
            stats.win_streak_ai = 0;
            stats.loss_streak_ai += 1;
        }
        Some(Side::Ai) => {
            stats.win_streak_ai += 1;
            stats.loss_streak_ai = 0;
            stats.win_streak_me = 0;
            stats.loss_streak_me += 1;
        }
        None => {
            stats.win_streak_me = 0;
            stats.win_streak_ai = 0;
        }
    }
    if let Some(side) = winner {
        energy::gain(state, side, WINNER_ENERGY_BONUS);
    }

    if state.stats.loss_streak_me == LOSS_STREAK_GAUGE {
        state.stats.loss_streak_me = 0;
        cards::add_gauge(state, Side::Me, 1);
    }
    if state.stats.win_streak_me == WIN_STREAK_GAUGE {
        state.stats.win_streak_me = 0;
        cards::add_gauge(state, Side::Me, 1);
    }
}

/// Close the round: event draws for both seats, score folding, winner and
/// streak bookkeeping, then advance to the next round.
pub fn finalize_round<O: PhaseObserver + ?Sized>(state: &mut GameState, observer: &mut O) {
    if state.phase() != RoundPhase::PostRoll {
        log::warn!("finalize_round ignored in {:?} phase", state.phase());
        return;
    }
    let index = state.round.index;
    state.round.temp_score = state.round.current_score;

    let drawn = events::draw_event(state);
    events::apply_event(state, &drawn, Side::Me);
    let drawn = events::draw_event(state);
    events::apply_event(state, &drawn, Side::Ai);

    state.round.temp_score = (state.round.temp_score + state.round.score_boost).max(0);
    let me = &mut state.players.me;
    me.total = (me.total + state.round.temp_score).max(TOTAL_MIN);
    let ai_round = state.round.current_scores.ai.max(0);
    let ai = &mut state.players.ai;
    ai.total = (ai.total + ai_round).max(TOTAL_MIN);
    // Opponent boosts count toward the round comparison only.
    state.round.current_scores.ai += state.round.score_boost_ai;

    let scores = state.round.current_scores;
    let winner = match scores.me.cmp(&scores.ai) {
        std::cmp::Ordering::Greater => Some(Side::Me),
        std::cmp::Ordering::Less => Some(Side::Ai),
        std::cmp::Ordering::Equal => None,
    };
    record_winner(state, winner);

    state.push_log(
        LOG_SCORE_FINAL,
        json!({ "round": state.round.temp_score, "total": state.players.me.total }),
    );
    notify(observer, Phase::RoundEnd, index);
    state.push_log(
        LOG_ROUND_END,
        json!({ "index": index, "roll": state.round.roll, "winner": winner }),
    );
    log::debug!(
        "round {index} end: scores {}-{} totals {}-{}",
        scores.me,
        scores.ai,
        state.players.me.total,
        state.players.ai.total
    );

    let used = std::mem::take(&mut state.round.used_cards);
    state.decks.cards.discard.extend(used);
    state.stats.last_round_scores = scores;
    state.round = state.round.next();

    if state.is_finished() {
        notify(observer, Phase::GameOver, index);
    }
}

/// `start_round` followed by `finalize_round`.
pub fn run_round<O: PhaseObserver + ?Sized>(
    state: &mut GameState,
    tendency: Tendency,
    observer: &mut O,
) {
    start_round(state, tendency, observer);
    finalize_round(state, observer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardType};
    use crate::observer::PhaseEvent;
    use crate::rng::DeterministicRng;
    use crate::state::GameConfig;

    fn fresh(seed: u32) -> GameState {
        GameState::new(GameConfig::default(), seed)
    }

    /// Find a seed whose first attack roll is a six followed by the wanted
    /// special.
    fn rig_attack_six(special: Special) -> GameState {
        (1..10_000_u32)
            .map(fresh)
            .find(|state| {
                let mut probe = state.rng.clone();
                dice::roll_dice(&mut probe) == 6
                    && dice::resolve_special(Tendency::Attack, 6, &mut probe) == Some(special)
            })
            .expect("seed with the requested special")
    }

    #[test]
    fn lightning_is_blocked_by_shield() {
        let mut state = rig_attack_six(Special::Lightning);
        state.players.me.shields = 1;
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.round.roll, Some(6));
        assert_eq!(state.round.current_score, 9);
        assert_eq!(state.players.me.shields, 0);
    }

    #[test]
    fn lightning_without_shield_costs_two() {
        let mut state = rig_attack_six(Special::Lightning);
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.round.current_score, 7);
        assert_eq!(state.players.me.shields, 0);
    }

    #[test]
    fn flame_always_schedules_a_curse() {
        let mut state = rig_attack_six(Special::Flame);
        state.players.me.shields = 2;
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.round.current_score, 9);
        assert_eq!(state.players.me.shields, 1);
        assert_eq!(state.scheduled.curse_next, 1);
    }

    #[test]
    fn target_doubles_and_boost_doubles_again() {
        let mut state = rig_attack_six(Special::Target);
        state.round.boost_active = true;
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.round.current_score, 36);
    }

    #[test]
    fn wrong_phase_calls_are_ignored() {
        let mut state = fresh(10);
        let before = state.clone();
        finalize_round(&mut state, &mut ());
        assert_eq!(state, before);

        start_round(&mut state, Tendency::Balance, &mut ());
        let rolled = state.clone();
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state, rolled);
    }

    #[test]
    fn balance_round_grants_energy_before_rolling() {
        let mut state = fresh(321);
        start_round(&mut state, Tendency::Balance, &mut ());
        assert_eq!(state.players.me.energy, 3);
        assert_eq!(state.players.me.gauge, 1);
        let roll = state.round.roll.map(i32::from);
        assert_eq!(Some(state.round.current_score), roll);
        assert_eq!(state.round.current_scores.me, state.round.current_score);
    }

    #[test]
    fn lucky_reroll_takes_the_higher_die() {
        let mut state = fresh(2468);
        state.scheduled.luck_next = true;
        let mut probe = state.rng.clone();
        let first = dice::roll_dice(&mut probe);
        let second = dice::roll_dice(&mut probe);
        start_round(&mut state, Tendency::Balance, &mut ());
        assert_eq!(state.round.roll, Some(first.max(second)));
        assert!(!state.scheduled.luck_next);
    }

    #[test]
    fn bonus_turn_adds_a_second_scored_roll() {
        let mut state = fresh(97);
        state.scheduled.bonus_turn_next = true;
        let mut probe: DeterministicRng = state.rng.clone();
        let first = dice::roll_dice(&mut probe);
        let second = dice::roll_dice(&mut probe);
        start_round(&mut state, Tendency::Balance, &mut ());
        assert_eq!(
            state.round.current_score,
            i32::from(first) + i32::from(second)
        );
        assert!(!state.scheduled.bonus_turn_next);
        assert!(state.log.iter().any(|e| e.tag == "bonus.roll"));
    }

    #[test]
    fn bonus_turn_doubles_both_rolls_while_boosted() {
        let mut state = fresh(97);
        state.scheduled.bonus_turn_next = true;
        state.round.boost_active = true;
        let mut probe = state.rng.clone();
        let first = i32::from(dice::roll_dice(&mut probe));
        let second = i32::from(dice::roll_dice(&mut probe));
        start_round(&mut state, Tendency::Balance, &mut ());
        assert_eq!(state.round.current_score, 2 * first + 2 * second);
        let bonus = state
            .log
            .iter()
            .find(|e| e.tag == "bonus.roll")
            .expect("bonus roll logged");
        assert_eq!(bonus.payload["score"], json!(2 * second));
    }

    #[test]
    fn repeated_face_fills_the_gauge() {
        let mut state = fresh(321);
        let roll = dice::roll_dice(&mut state.rng.clone());
        state.stats.roll_counts.insert(roll, 1);
        start_round(&mut state, Tendency::Balance, &mut ());
        assert_eq!(state.stats.roll_counts.get(&roll), Some(&2));
        // One point from balance, one from the repeat.
        assert_eq!(state.players.me.gauge, 2);
    }

    #[test]
    fn second_consecutive_six_draws_a_free_card() {
        let mut state = rig_attack_six(Special::Lightning);
        state.stats.consec_six = 1;
        state.players.me.gauge = 2;
        let hand = state.players.me.cards.len();
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.players.me.cards.len(), hand + 1);
        assert_eq!(state.players.me.gauge, 2);
        assert_eq!(state.stats.consec_six, 0);
        assert!(state.log.iter().any(|e| e.tag == "gauge.free-draw"));
    }

    #[test]
    fn single_six_only_starts_the_streak() {
        let mut state = rig_attack_six(Special::Lightning);
        let hand = state.players.me.cards.len();
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.stats.consec_six, 1);
        assert_eq!(state.players.me.cards.len(), hand);
        assert_eq!(state.players.me.gauge, 0);
    }

    #[test]
    fn high_round_score_adds_gauge() {
        let mut state = rig_attack_six(Special::Target);
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.round.current_score, 18);
        assert_eq!(state.players.me.gauge, 1);
    }

    #[test]
    fn two_round_loss_streak_adds_gauge_and_resets() {
        let mut state = fresh(12);
        state.decks.events = crate::state::Pile::default();
        state.stats.loss_streak_me = 1;
        state.round.roll = Some(1);
        state.round.current_score = 0;
        state.round.current_scores = crate::state::SideScores { me: 0, ai: 3 };
        finalize_round(&mut state, &mut ());
        assert_eq!(state.stats.last_winner, Some(Side::Ai));
        assert_eq!(state.stats.loss_streak_me, 0);
        assert_eq!(state.players.me.gauge, 1);
    }

    #[test]
    fn three_round_win_streak_adds_gauge_and_resets() {
        let mut state = fresh(12);
        state.decks.events = crate::state::Pile::default();
        state.stats.win_streak_me = 2;
        state.round.roll = Some(5);
        state.round.current_score = 5;
        state.round.current_scores = crate::state::SideScores { me: 5, ai: 1 };
        finalize_round(&mut state, &mut ());
        assert_eq!(state.stats.last_winner, Some(Side::Me));
        assert_eq!(state.stats.win_streak_me, 0);
        assert_eq!(state.players.me.gauge, 1);
    }

    #[test]
    fn curse_is_consumed_at_round_start() {
        let mut state = fresh(55);
        state.scheduled.curse_next = 3;
        start_round(&mut state, Tendency::Defense, &mut ());
        assert_eq!(state.scheduled.curse_next, 0);
        assert_eq!(state.round.temp_score, 0);
    }

    #[test]
    fn energy_after_a_lost_round_is_three() {
        let mut state = fresh(8);
        state.stats.last_winner = Some(Side::Ai);
        start_round(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state.players.me.energy, 3);
    }

    #[test]
    fn finalize_folds_scores_and_awards_winner() {
        let mut state = fresh(12);
        state.decks.events = crate::state::Pile::default();
        start_round(&mut state, Tendency::Balance, &mut ());
        let me_score = state.round.current_score;
        state.round.current_scores.ai = 0;
        state.round.roll_ai = Some(1);
        let energy_before = state.players.me.energy;
        finalize_round(&mut state, &mut ());
        assert_eq!(state.players.me.total, 1 + me_score);
        assert_eq!(state.players.ai.total, 1);
        assert_eq!(state.stats.last_winner, Some(Side::Me));
        assert_eq!(state.players.me.energy, (energy_before + 1).min(10));
        assert_eq!(state.stats.win_streak_me, 1);
        assert_eq!(state.stats.loss_streak_ai, 1);
        assert_eq!(state.round.index, 2);
        assert_eq!(state.round.roll, None);
        assert_eq!(state.stats.last_round_scores.me, me_score);
    }

    #[test]
    fn ai_score_boost_counts_for_comparison_only() {
        let mut state = fresh(12);
        state.decks.events = crate::state::Pile::default();
        state.round.roll = Some(3);
        state.round.current_score = 3;
        state.round.current_scores = crate::state::SideScores { me: 3, ai: 2 };
        state.round.score_boost_ai = 2;
        finalize_round(&mut state, &mut ());
        assert_eq!(state.players.ai.total, 3);
        assert_eq!(state.stats.last_round_scores.ai, 4);
        assert_eq!(state.stats.last_winner, Some(Side::Ai));
    }

    #[test]
    fn tie_resets_win_streaks() {
        let mut state = fresh(12);
        state.decks.events = crate::state::Pile::default();
        state.stats.win_streak_me = 2;
        state.stats.loss_streak_ai = 1;
        state.round.roll = Some(4);
        state.round.current_score = 4;
        state.round.current_scores = crate::state::SideScores { me: 4, ai: 4 };
        finalize_round(&mut state, &mut ());
        assert_eq!(state.stats.last_winner, None);
        assert_eq!(state.stats.win_streak_me, 0);
        assert_eq!(state.stats.loss_streak_ai, 1);
    }

    #[test]
    fn used_cards_move_to_discard_at_finalize() {
        let mut state = fresh(12);
        state.players.me.cards.push(Card::new("T1", CardType::Defense));
        state.players.me.energy = 5;
        assert_eq!(cards::use_card(&mut state, CardType::Defense), Ok(true));
        start_round(&mut state, Tendency::Attack, &mut ());
        finalize_round(&mut state, &mut ());
        assert!(state.round.used_cards.is_empty());
        assert!(state.decks.cards.discard.iter().any(|c| c.id == "T1"));
    }

    #[test]
    fn observers_see_phases_in_order() {
        let mut state = GameState::new(GameConfig::default().with_rounds(1), 77);
        let mut seen: Vec<PhaseEvent> = Vec::new();
        start_round(&mut state, Tendency::Attack, &mut seen);
        start_round_ai(&mut state, Tendency::Defense, &mut seen);
        finalize_round(&mut state, &mut seen);
        let phases: Vec<Phase> = seen.iter().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::RoundStart,
                Phase::RoundStartAi,
                Phase::RoundEnd,
                Phase::GameOver
            ]
        );
        assert!(seen.iter().all(|e| e.round == 1));
    }

    #[test]
    fn ai_half_round_runs_once_per_round() {
        let mut state = fresh(5);
        start_round_ai(&mut state, Tendency::Balance, &mut ());
        let roll = state.round.roll_ai;
        assert!(roll.is_some());
        assert_eq!(state.players.ai.energy, 3);
        assert_eq!(state.players.ai.gauge, 1);
        let snapshot = state.clone();
        start_round_ai(&mut state, Tendency::Attack, &mut ());
        assert_eq!(state, snapshot);
        assert_eq!(
            state.round.current_scores.ai,
            roll.map_or(0, i32::from)
        );
    }
}
