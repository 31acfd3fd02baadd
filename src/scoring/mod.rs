//! Fitness and rarity scoring for uploaded artifact inventories.
//!
//! An uploaded artifact set is scored against the user's enabled builds in
//! one orchestrated pass: rarity once per artifact, fitness over the full
//! (artifact x build) cross product. The pass runs off the interactive path
//! on the blocking pool and streams tagged progress/result messages; results
//! are memoized per (artifact set, build-configuration fingerprint) so
//! toggling builds never recomputes a known configuration.

pub mod cache;
pub mod domain;
pub mod fingerprint;
pub mod fitness;
pub mod orchestrator;
pub mod rarity;
pub mod router;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use cache::ResultCache;
pub use domain::{
    enabled_builds, Artifact, ArtifactSetId, Build, BuildEntry, BuildMap, FitnessTable,
    MalformedArtifact, RarityTable, ScoringTables, StatValue,
};
pub use fingerprint::{fingerprint_builds, BuildFingerprint};
pub use orchestrator::{
    run_scoring, spawn_scoring, ChannelSink, NullSink, ProgressSink, RunState, ScoringOutcome,
    ScoringUpdate,
};
pub use router::scoring_router;
pub use service::{RunStatusView, ScoringService, SubmitOutcome};
pub use stats::StatKind;
