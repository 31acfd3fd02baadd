use std::collections::HashMap;

use super::domain::{Artifact, Build, MAX_SUBSTATS};
use super::stats;

/// Theoretical maximum weighted raw score for a (tier, build) pair: the four
/// substat kinds with the highest `weight x max_roll`, each credited with a
/// fully-upgraded maximum. A per-pair constant, independent of any concrete
/// artifact.
pub fn theoretical_max(build: &Build, rarity: u8) -> f64 {
    let mut contributions: Vec<f64> = stats::SUBSTAT_KINDS
        .iter()
        .filter_map(|kind| {
            let roll = stats::max_roll(*kind, rarity)?;
            Some(build.weight(*kind) * roll)
        })
        .collect();
    contributions.sort_by(|a, b| b.total_cmp(a));
    let per_roll: f64 = contributions.iter().take(MAX_SUBSTATS).sum();
    per_roll * f64::from(stats::max_rolls(rarity))
}

/// Pass-local memo of [`theoretical_max`] keyed by (tier, build key), reused
/// across every artifact sharing that tier.
#[derive(Default)]
pub(crate) struct MaxScoreCache {
    entries: HashMap<(u8, String), f64>,
}

impl MaxScoreCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn max_raw(&mut self, rarity: u8, key: &str, build: &Build) -> f64 {
        *self
            .entries
            .entry((rarity, key.to_string()))
            .or_insert_with(|| theoretical_max(build, rarity))
    }
}

/// Normalized similarity between an artifact's substats and a build's
/// weighted preferences, in [0,1].
pub fn score(artifact: &Artifact, build: &Build) -> f64 {
    score_with_max(artifact, build, theoretical_max(build, artifact.rarity))
}

pub(crate) fn score_with_max(artifact: &Artifact, build: &Build, max_raw: f64) -> f64 {
    let Some(main) = &artifact.main_stat else {
        return 0.0;
    };
    // A mismatched main stat makes the artifact unusable for the build
    // regardless of substats.
    if !build.allows_main_stat(artifact.position, main.kind) {
        return 0.0;
    }

    let raw: f64 = artifact
        .substats
        .iter()
        .map(|substat| build.weight(substat.kind) * substat.value)
        .sum();

    // All-zero weights leave both raw and max at zero; 0/0 is defined as 0.
    if max_raw <= 0.0 || !max_raw.is_finite() {
        return 0.0;
    }
    (raw / max_raw).clamp(0.0, 1.0)
}
