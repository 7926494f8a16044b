use anyhow::Result;
use dicebattle_game::{
    CardType, Difficulty, GameConfig, GameMode, GameOutcome, GameState, PhaseEvent, Side,
    apply_cards, choose_tendency, finalize_round, normalize_seed, outcome, start_round,
    start_round_ai,
};
use std::sync::Arc;

use super::policy::{SeatPolicy, Strategy};

/// Declarative description of one automated game.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub mode: GameMode,
    pub strategy: Strategy,
    pub opponent: Difficulty,
    pub rounds: Option<u32>,
    pub check_replay: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(mode: GameMode, strategy: Strategy) -> Self {
        Self {
            mode,
            strategy,
            opponent: Difficulty::Normal,
            rounds: None,
            check_replay: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_opponent(mut self, opponent: Difficulty) -> Self {
        self.opponent = opponent;
        self
    }

    #[must_use]
    pub const fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.check_replay = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    #[must_use]
    pub fn config(&self) -> GameConfig {
        let config = GameConfig::for_mode(self.mode);
        match self.rounds {
            Some(rounds) => config.with_rounds(rounds).normalized(),
            None => config,
        }
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn = Arc<dyn Fn(&GameSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &GameSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&GameSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulated game.
#[derive(Debug, Clone)]
pub struct GameSummary {
    pub seed: u64,
    pub game_seed: u32,
    pub strategy: Strategy,
    pub final_state: GameState,
    pub outcome: Option<GameOutcome>,
    /// Invariant breaches, each prefixed with the transition that caused it.
    pub violations: Vec<String>,
    pub phases: Vec<PhaseEvent>,
    pub cards_played: usize,
    pub rounds_won_me: u32,
    pub rounds_won_ai: u32,
    pub rounds_tied: u32,
    pub replay_matches: Option<bool>,
}

impl GameSummary {
    #[must_use]
    pub fn winner_label(&self) -> &'static str {
        match self.outcome.and_then(|o| o.winner) {
            Some(side) => side.as_str(),
            None if self.outcome.is_some() => "draw",
            None => "unfinished",
        }
    }
}

/// Headless deterministic runner for the round engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameSimulator {
    verbose: bool,
}

impl GameSimulator {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Truncate a CLI seed to the engine's 32-bit seed space.
    #[must_use]
    pub fn game_seed(seed: u64) -> u32 {
        normalize_seed(u32::try_from(seed & u64::from(u32::MAX)).unwrap_or_default())
    }

    #[must_use]
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> GameSummary {
        let mut summary = self.play(plan, seed);
        if plan.check_replay {
            let replay = self.play(plan, seed);
            summary.replay_matches = Some(same_bytes(&summary.final_state, &replay.final_state));
        }
        summary
    }

    fn play(&self, plan: &SimulationPlan, seed: u64) -> GameSummary {
        let config = plan.config();
        let game_seed = Self::game_seed(seed);
        let mut state = GameState::new(config, game_seed);
        let mut policy = plan.strategy.create_policy(seed, plan.opponent.params());
        let ai_params = plan.opponent.params();

        let mut phases: Vec<PhaseEvent> = Vec::new();
        let mut violations = Vec::new();
        let mut cards_played = 0;
        let (mut won_me, mut won_ai, mut tied) = (0, 0, 0);

        // One spare pass so a stuck round counter shows up as a violation
        // instead of a hang.
        for _ in 0..=config.rounds {
            if state.is_finished() {
                break;
            }
            let round = state.round.index;
            let me = policy.pick_tendency(&state, Side::Me);
            let ai = choose_tendency(&state, Side::Ai, &ai_params);

            let pre = policy.pre_roll_cards(&state);
            cards_played += play_cards(&mut state, &pre, round, "pre-roll", &mut violations);
            check(&state, round, "pre-roll cards", &mut violations);

            start_round(&mut state, me, &mut phases);
            check(&state, round, "start_round", &mut violations);
            start_round_ai(&mut state, ai, &mut phases);
            check(&state, round, "start_round_ai", &mut violations);

            let post = policy.post_roll_cards(&state);
            cards_played += play_cards(&mut state, &post, round, "post-roll", &mut violations);
            check(&state, round, "post-roll cards", &mut violations);

            finalize_round(&mut state, &mut phases);
            check(&state, round, "finalize_round", &mut violations);

            match state.stats.last_winner {
                Some(Side::Me) => won_me += 1,
                Some(Side::Ai) => won_ai += 1,
                None => tied += 1,
            }

            if self.verbose {
                println!(
                    "🎲 Round {round}: {me} vs {ai} -> totals {}-{}",
                    state.players.me.total, state.players.ai.total
                );
            }
            log::debug!(
                "seed {game_seed} round {round}: {me} vs {ai} -> me {} ai {} ({})",
                state.players.me.total,
                state.players.ai.total,
                policy.name()
            );
        }

        if !state.is_finished() {
            violations.push(format!(
                "game stopped at round {} of {}",
                state.round.index, state.config.rounds
            ));
        }

        GameSummary {
            seed,
            game_seed,
            strategy: plan.strategy,
            outcome: outcome(&state),
            final_state: state,
            violations,
            phases,
            cards_played,
            rounds_won_me: won_me,
            rounds_won_ai: won_ai,
            rounds_tied: tied,
            replay_matches: None,
        }
    }
}

fn play_cards(
    state: &mut GameState,
    picks: &[CardType],
    round: u32,
    stage: &str,
    violations: &mut Vec<String>,
) -> usize {
    match apply_cards(state, picks) {
        Ok(played) => played,
        Err(err) => {
            violations.push(format!("round {round} {stage}: {err}"));
            0
        }
    }
}

fn check(state: &GameState, round: u32, stage: &str, violations: &mut Vec<String>) {
    violations.extend(
        state
            .invariant_violations()
            .into_iter()
            .map(|issue| format!("round {round} after {stage}: {issue}")),
    );
}

fn same_bytes(left: &GameState, right: &GameState) -> bool {
    match (serde_json::to_string(left), serde_json::to_string(right)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
