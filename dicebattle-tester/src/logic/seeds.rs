use anyhow::{Result, bail};
use dicebattle_game::constants::DEFAULT_SEED;
use std::collections::HashSet;

/// Resolve CLI seed tokens into a deduplicated seed list.
///
/// Negative integers contribute their magnitude. An empty list falls back to
/// the engine's default seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let seed = if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else if let Ok(value) = token.parse::<u64>() {
            value
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        if seen.insert(seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(u64::from(DEFAULT_SEED));
    }

    Ok(seeds)
}
