use super::domain::Artifact;
use super::stats;

/// Upper end of the rarity scale exposed to collaborators.
pub const MAX_SCORE: f64 = 10.0;

/// Absolute tolerance when ranking a rolled value against the discrete
/// table, absorbing the decimal rounding applied by upload formats.
const ROLL_TOLERANCE: f64 = 1e-6;

/// Statistical luck of an artifact's substat rolls, in [0,10], independent
/// of any build.
///
/// Each present substat is ranked against the discrete roll table for its
/// kind at the artifact's tier; the mean percentile is scaled to the output
/// range. Substats the artifact has not rolled yet are simply absent from
/// the mean, so a young artifact with two excellent rolls outranks a full
/// one with four mediocre rolls.
pub fn score(artifact: &Artifact) -> f64 {
    let mut total = 0.0;
    let mut counted = 0usize;
    for substat in &artifact.substats {
        let Some(table) = stats::roll_values(substat.kind, artifact.rarity) else {
            continue;
        };
        total += percentile(table, substat.value);
        counted += 1;
    }
    if counted == 0 {
        return 0.0;
    }
    (total / counted as f64) * MAX_SCORE
}

/// Rank of `value` among the table's discrete rolls: k/M when the value
/// matches the k-th lowest roll. Accumulated multi-roll values rank at the
/// top; values below the lowest roll rank at zero.
fn percentile(table: &[f64], value: f64) -> f64 {
    let rank = table
        .iter()
        .filter(|roll| **roll <= value + ROLL_TOLERANCE)
        .count();
    rank as f64 / table.len() as f64
}
