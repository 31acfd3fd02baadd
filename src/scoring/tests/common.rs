use std::collections::{BTreeMap, BTreeSet};

use crate::scoring::domain::{Artifact, Build, BuildMap, StatValue};
use crate::scoring::stats::{self, StatKind};

pub(super) fn stat(kind: StatKind, value: f64) -> StatValue {
    StatValue { kind, value }
}

pub(super) fn five_star(position: u8, main: StatKind, substats: Vec<StatValue>) -> Artifact {
    Artifact {
        set: "gladiator".to_string(),
        position,
        main_stat: Some(stat(main, 46.6)),
        substats,
        rarity: 5,
        locked: false,
    }
}

pub(super) fn build_with_weights(entries: &[(StatKind, f64)]) -> Build {
    let mut weights = BTreeMap::new();
    for (kind, weight) in entries {
        weights.insert(*kind, *weight);
    }
    Build {
        weights,
        main_stats: BTreeMap::new(),
    }
}

pub(super) fn crit_build() -> Build {
    build_with_weights(&[
        (StatKind::CritRate, 1.0),
        (StatKind::CritDmg, 1.0),
        (StatKind::AtkPct, 0.8),
        (StatKind::EnergyRecharge, 0.4),
    ])
}

pub(super) fn restrict_main_stat(build: &mut Build, position: u8, kinds: &[StatKind]) {
    build
        .main_stats
        .insert(position, kinds.iter().copied().collect::<BTreeSet<_>>());
}

pub(super) fn single_build(key: &str, build: Build) -> BuildMap {
    let mut builds = BuildMap::new();
    builds.insert(key.to_string(), build);
    builds
}

/// Max single roll at the artifact's tier, fully upgraded.
pub(super) fn maxed_value(kind: StatKind, rarity: u8) -> f64 {
    stats::max_roll(kind, rarity).expect("substat kind")
        * f64::from(stats::max_rolls(rarity))
}

/// The scenario artifact: four substats, each fully rolled at the tier
/// maximum, covering exactly the kinds the paired build weights.
pub(super) fn maxed_artifact(kinds: [StatKind; 4]) -> Artifact {
    let substats = kinds
        .iter()
        .map(|kind| stat(*kind, maxed_value(*kind, 5)))
        .collect();
    five_star(2, StatKind::Atk, substats)
}

pub(super) fn flat_weights(kinds: [StatKind; 4]) -> Build {
    let entries: Vec<(StatKind, f64)> = kinds.iter().map(|kind| (*kind, 1.0)).collect();
    build_with_weights(&entries)
}
