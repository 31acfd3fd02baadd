use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::stats::{self, StatKind, MAX_RARITY, MIN_RARITY};

/// Identifier wrapper for an uploaded artifact collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactSetId(pub String);

/// A stat kind together with its rolled or fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub kind: StatKind,
    pub value: f64,
}

/// One equippable item as uploaded by the collaborator layer.
///
/// Identity is positional: the index of the artifact in the submitted list.
/// The engine only reads artifacts; `locked` is informational and never
/// consulted by scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub set: String,
    pub position: u8,
    pub main_stat: Option<StatValue>,
    #[serde(default)]
    pub substats: Vec<StatValue>,
    pub rarity: u8,
    #[serde(default)]
    pub locked: bool,
}

pub const MIN_POSITION: u8 = 1;
pub const MAX_POSITION: u8 = 5;
pub const MAX_SUBSTATS: usize = 4;

impl Artifact {
    /// Structural checks the scorers rely on. A failing artifact is skipped
    /// by the scoring pass, never scored partially.
    pub fn validate(&self) -> Result<(), MalformedArtifact> {
        let main = self
            .main_stat
            .as_ref()
            .ok_or(MalformedArtifact::MissingMainStat)?;
        if !main.value.is_finite() {
            return Err(MalformedArtifact::NonFiniteValue { kind: main.kind });
        }
        if !(MIN_RARITY..=MAX_RARITY).contains(&self.rarity) {
            return Err(MalformedArtifact::InvalidRarity {
                rarity: self.rarity,
            });
        }
        if !(MIN_POSITION..=MAX_POSITION).contains(&self.position) {
            return Err(MalformedArtifact::InvalidPosition {
                position: self.position,
            });
        }
        if self.substats.len() > MAX_SUBSTATS {
            return Err(MalformedArtifact::TooManySubstats {
                count: self.substats.len(),
            });
        }
        for substat in &self.substats {
            if !stats::is_substat(substat.kind) {
                return Err(MalformedArtifact::NotASubstat {
                    kind: substat.kind,
                });
            }
            if !substat.value.is_finite() {
                return Err(MalformedArtifact::NonFiniteValue {
                    kind: substat.kind,
                });
            }
        }
        Ok(())
    }
}

/// Reasons an artifact is excluded from the score tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedArtifact {
    #[error("artifact has no main stat")]
    MissingMainStat,
    #[error("rarity {rarity} outside the 1-5 star range")]
    InvalidRarity { rarity: u8 },
    #[error("position {position} outside the 1-5 slot range")]
    InvalidPosition { position: u8 },
    #[error("{count} substats exceeds the maximum of 4")]
    TooManySubstats { count: usize },
    #[error("{} cannot roll as a substat", .kind.label())]
    NotASubstat { kind: StatKind },
    #[error("{} carries a non-finite value", .kind.label())]
    NonFiniteValue { kind: StatKind },
}

/// A character's target stat-weighting profile.
///
/// `main_stats` lists the allowed main-stat kinds per slot; an absent slot
/// (or an empty allow-list) places no restriction. Weights default to zero
/// for kinds not listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Build {
    #[serde(default)]
    pub weights: BTreeMap<StatKind, f64>,
    #[serde(default)]
    pub main_stats: BTreeMap<u8, BTreeSet<StatKind>>,
}

impl Build {
    pub fn weight(&self, kind: StatKind) -> f64 {
        self.weights.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn allows_main_stat(&self, position: u8, kind: StatKind) -> bool {
        match self.main_stats.get(&position) {
            Some(allowed) if !allowed.is_empty() => allowed.contains(&kind),
            _ => true,
        }
    }
}

/// Transport-side build record: the enabled flag lives here so the engine
/// itself only ever sees builds that are switched on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildEntry {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub weights: BTreeMap<StatKind, f64>,
    #[serde(default)]
    pub main_stats: BTreeMap<u8, BTreeSet<StatKind>>,
}

fn default_enabled() -> bool {
    true
}

impl BuildEntry {
    fn into_build(self) -> Build {
        Build {
            weights: self.weights,
            main_stats: self.main_stats,
        }
    }
}

/// Enabled builds keyed by build name.
pub type BuildMap = BTreeMap<String, Build>;

/// Collaborator-side filter from configured builds down to the enabled map.
pub fn enabled_builds(entries: BTreeMap<String, BuildEntry>) -> BuildMap {
    entries
        .into_iter()
        .filter(|(_, entry)| entry.enabled)
        .map(|(key, entry)| (key, entry.into_build()))
        .collect()
}

/// Artifact index -> build key -> fitness in [0,1].
pub type FitnessTable = BTreeMap<usize, BTreeMap<String, f64>>;

/// Artifact index -> rarity score in [0,10].
pub type RarityTable = BTreeMap<usize, f64>;

/// The two result tables, produced and delivered as one unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringTables {
    pub all_fits: FitnessTable,
    pub all_rarity: RarityTable,
}

impl ScoringTables {
    pub fn is_empty(&self) -> bool {
        self.all_fits.is_empty() && self.all_rarity.is_empty()
    }
}
