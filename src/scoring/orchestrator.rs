use std::collections::BTreeMap;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use super::domain::{Artifact, BuildMap, RarityTable, ScoringTables};
use super::fingerprint::{fingerprint_builds, BuildFingerprint};
use super::fitness::{self, MaxScoreCache};
use super::rarity;

/// Lifecycle of a scoring run as observed by collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Complete,
    Failed,
}

impl RunState {
    pub const fn label(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Complete => "complete",
            RunState::Failed => "failed",
        }
    }
}

/// Message emitted by a scoring run. The tagged variants keep a progress
/// fraction from ever being mistaken for a result payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringUpdate {
    Progress(f64),
    Finished(ScoringOutcome),
}

/// Terminal payload of a run: the tables plus the build fingerprint that was
/// in effect when the run started, so a receiver can detect staleness.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutcome {
    pub fingerprint: BuildFingerprint,
    pub tables: ScoringTables,
    /// Indices of artifacts excluded as malformed.
    pub skipped: Vec<usize>,
}

/// Seam through which the scoring pass reports progress, so the same pass
/// body serves the background channel, the CLI, and tests.
pub trait ProgressSink: Send {
    fn progress(&mut self, fraction: f64);
}

/// Sink for callers that do not observe progress.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&mut self, _fraction: f64) {}
}

/// Sink forwarding progress over a run's update channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ScoringUpdate>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ScoringUpdate>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn progress(&mut self, fraction: f64) {
        let _ = self.tx.send(ScoringUpdate::Progress(fraction));
    }
}

/// The scoring pass: rarity once per artifact, fitness over the full
/// (artifact x enabled build) cross product.
///
/// This is the single implementation behind both execution paths; the
/// background context wraps it in [`spawn_scoring`], synchronous callers
/// invoke it directly. Rarity is build-independent, so a caller that
/// already holds a rarity table for this artifact set may pass it as
/// `rarity_seed` and only fitness is recomputed. Progress is reported at 0,
/// after every `progress_batch` artifacts, and exactly 1.0 at the end; the
/// reported fraction never decreases and never exceeds 1. Malformed
/// artifacts are skipped with a warning and the pass continues.
pub fn run_scoring(
    artifacts: &[Artifact],
    builds: &BuildMap,
    rarity_seed: Option<&RarityTable>,
    progress_batch: usize,
    sink: &mut dyn ProgressSink,
) -> ScoringOutcome {
    let fingerprint = fingerprint_builds(builds);
    sink.progress(0.0);

    let mut tables = ScoringTables::default();
    let mut skipped = Vec::new();

    // Absence of work is not an error: empty tables, immediate completion.
    if artifacts.is_empty() || builds.is_empty() {
        sink.progress(1.0);
        return ScoringOutcome {
            fingerprint,
            tables,
            skipped,
        };
    }

    let batch = progress_batch.max(1);
    let total = artifacts.len();
    let mut max_cache = MaxScoreCache::new();

    for (index, artifact) in artifacts.iter().enumerate() {
        match artifact.validate() {
            Ok(()) => {
                let luck = rarity_seed
                    .and_then(|seed| seed.get(&index).copied())
                    .unwrap_or_else(|| rarity::score(artifact));
                tables.all_rarity.insert(index, luck);
                let fits: BTreeMap<String, f64> = builds
                    .iter()
                    .map(|(key, build)| {
                        let max_raw = max_cache.max_raw(artifact.rarity, key, build);
                        (key.clone(), fitness::score_with_max(artifact, build, max_raw))
                    })
                    .collect();
                tables.all_fits.insert(index, fits);
            }
            Err(reason) => {
                warn!(index, %reason, "skipping malformed artifact");
                skipped.push(index);
            }
        }

        let done = index + 1;
        if done % batch == 0 && done < total {
            sink.progress(done as f64 / total as f64);
        }
    }

    sink.progress(1.0);
    ScoringOutcome {
        fingerprint,
        tables,
        skipped,
    }
}

/// Run the pass on the blocking pool, streaming updates over a channel.
///
/// The caller never blocks: it receives `Progress` messages followed by one
/// `Finished`, after which the channel closes. A run is never interrupted;
/// superseded results are discarded by fingerprint at the receiver.
pub fn spawn_scoring(
    artifacts: Vec<Artifact>,
    builds: BuildMap,
    rarity_seed: Option<RarityTable>,
    progress_batch: usize,
) -> mpsc::UnboundedReceiver<ScoringUpdate> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        let mut sink = ChannelSink::new(tx.clone());
        let outcome = run_scoring(
            &artifacts,
            &builds,
            rarity_seed.as_ref(),
            progress_batch,
            &mut sink,
        );
        let _ = tx.send(ScoringUpdate::Finished(outcome));
    });
    rx
}
