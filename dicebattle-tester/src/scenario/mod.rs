use anyhow::{Result, ensure};
use dicebattle_game::{Difficulty, GameMode, Phase};

use crate::logic::{GameSummary, SimulationPlan, Strategy};

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn sound_game_expectation(summary: &GameSummary) -> Result<()> {
    ensure!(
        summary.violations.is_empty(),
        "invariants broken: {}",
        summary.violations.join("; ")
    );
    ensure!(
        summary.final_state.is_finished(),
        "game did not finish ({} of {} rounds)",
        summary.final_state.rounds_played(),
        summary.final_state.config.rounds
    );
    Ok(())
}

fn completed_game_expectation(summary: &GameSummary) -> Result<()> {
    sound_game_expectation(summary)?;
    let outcome = summary
        .outcome
        .ok_or_else(|| anyhow::anyhow!("finished game has no outcome"))?;
    ensure!(
        outcome.totals.me == summary.final_state.players.me.total
            && outcome.totals.ai == summary.final_state.players.ai.total,
        "outcome totals disagree with player totals"
    );
    let rounds = summary.rounds_won_me + summary.rounds_won_ai + summary.rounds_tied;
    ensure!(
        rounds == summary.final_state.config.rounds,
        "{rounds} round results for a {}-round game",
        summary.final_state.config.rounds
    );
    Ok(())
}

fn replay_expectation(summary: &GameSummary) -> Result<()> {
    completed_game_expectation(summary)?;
    ensure!(
        summary.replay_matches == Some(true),
        "replaying seed {} produced a different final state",
        summary.game_seed
    );
    Ok(())
}

fn phase_stream_expectation(summary: &GameSummary) -> Result<()> {
    completed_game_expectation(summary)?;
    let rounds = usize::try_from(summary.final_state.config.rounds)?;
    ensure!(
        summary.phases.len() == rounds * 3 + 1,
        "expected {} phase notifications, saw {}",
        rounds * 3 + 1,
        summary.phases.len()
    );
    let game_over = summary
        .phases
        .iter()
        .filter(|event| event.phase == Phase::GameOver)
        .count();
    ensure!(
        game_over == 1 && summary.phases.last().map(|e| e.phase) == Some(Phase::GameOver),
        "game-over must be the single final notification"
    );
    Ok(())
}

fn full_game_scenario(strategy: Strategy) -> TestScenario {
    TestScenario::simulation(
        format!("Full Game - {}", strategy.label()),
        SimulationPlan::new(GameMode::Normal, strategy).with_expectation(completed_game_expectation),
    )
}

fn base_scenario(name: &str) -> Option<TestScenario> {
    let scenario = match name {
        "smoke" => TestScenario::simulation(
            "Smoke Test",
            SimulationPlan::new(GameMode::Quick, Strategy::Balance)
                .with_expectation(sound_game_expectation),
        ),
        "full-game-attack" | "attack" => full_game_scenario(Strategy::Attack),
        "full-game-defense" | "defense" => full_game_scenario(Strategy::Defense),
        "full-game-balance" | "balance" => full_game_scenario(Strategy::Balance),
        "full-game-autopilot" | "autopilot" => full_game_scenario(Strategy::Autopilot),
        "full-game-random" | "random" => full_game_scenario(Strategy::Random),
        "determinism" | "replay" => TestScenario::simulation(
            "Deterministic Replay",
            SimulationPlan::new(GameMode::Normal, Strategy::Autopilot)
                .with_replay_check()
                .with_expectation(replay_expectation),
        ),
        "invariants" | "extended" => TestScenario::simulation(
            "Extended Game Invariants",
            SimulationPlan::new(GameMode::Extended, Strategy::Random)
                .with_expectation(phase_stream_expectation),
        ),
        _ => return None,
    };
    Some(scenario)
}

/// Look up a scenario by key or alias, applying the opponent difficulty and
/// an optional round override.
pub fn get_scenario(name: &str, opponent: Difficulty, rounds: Option<u32>) -> Option<TestScenario> {
    let mut scenario = base_scenario(name.trim().to_lowercase().as_str())?;
    scenario.plan = scenario.plan.with_opponent(opponent);
    if let Some(rounds) = rounds {
        scenario.plan = scenario.plan.with_rounds(rounds);
    }
    Some(scenario)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("full-game-attack", "Full Game - Always Attack"),
        ("full-game-defense", "Full Game - Always Defend"),
        ("full-game-balance", "Full Game - Always Balance"),
        ("full-game-autopilot", "Full Game - Autopilot"),
        ("full-game-random", "Full Game - Random"),
        ("determinism", "Deterministic Replay"),
        ("invariants", "Extended Game Invariants"),
    ]
}
