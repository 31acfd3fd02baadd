use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;

use super::cache::ResultCache;
use super::domain::{Artifact, ArtifactSetId, BuildMap, ScoringTables};
use super::fingerprint::{fingerprint_builds, BuildFingerprint};
use super::orchestrator::{
    run_scoring, spawn_scoring, NullSink, RunState, ScoringOutcome, ScoringUpdate,
};

/// Service composing the orchestrator and the result cache behind one
/// facade: run bookkeeping, the supersede/discard policy, and status views
/// for the API layer.
pub struct ScoringService {
    cache: ResultCache,
    runs: Mutex<HashMap<ArtifactSetId, RunRecord>>,
    progress_batch: usize,
}

#[derive(Debug, Clone)]
struct RunRecord {
    state: RunState,
    progress: f64,
    fingerprint: BuildFingerprint,
    started_at: DateTime<Utc>,
    skipped: Vec<usize>,
}

impl RunRecord {
    fn new(state: RunState, progress: f64, fingerprint: BuildFingerprint) -> Self {
        Self {
            state,
            progress,
            fingerprint,
            started_at: Utc::now(),
            skipped: Vec::new(),
        }
    }
}

/// What a submission did.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Served from the cache or completed inline (empty input).
    Complete {
        fingerprint: BuildFingerprint,
        tables: Arc<ScoringTables>,
    },
    /// A background run was started for this fingerprint.
    Started { fingerprint: BuildFingerprint },
    /// A run for this exact fingerprint is already in flight.
    AlreadyRunning { fingerprint: BuildFingerprint },
}

/// Snapshot of a run exposed through the API.
#[derive(Debug, Clone, Serialize)]
pub struct RunStatusView {
    pub state: RunState,
    pub progress: f64,
    pub fingerprint: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ScoringTables>,
}

impl ScoringService {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            cache: ResultCache::default(),
            runs: Mutex::new(HashMap::new()),
            progress_batch: config.progress_batch,
        }
    }

    /// Submit an artifact set with its enabled-build map.
    ///
    /// Cache hits and empty inputs complete immediately. Otherwise a
    /// background run starts, superseding any in-flight run for the same
    /// artifact set with a different fingerprint; a resubmission of the
    /// in-flight fingerprint is a no-op.
    pub fn submit(
        self: &Arc<Self>,
        set_id: ArtifactSetId,
        artifacts: Vec<Artifact>,
        builds: BuildMap,
    ) -> SubmitOutcome {
        let fingerprint = fingerprint_builds(&builds);

        if let Some(tables) = self.cache.lookup(&set_id, fingerprint) {
            let mut runs = self.runs.lock().expect("scoring runs mutex poisoned");
            let keep = runs.get(&set_id).is_some_and(|record| {
                record.fingerprint == fingerprint && record.state == RunState::Complete
            });
            if !keep {
                runs.insert(
                    set_id.clone(),
                    RunRecord::new(RunState::Complete, 1.0, fingerprint),
                );
            }
            debug!(set = %set_id.0, %fingerprint, "serving cached scoring tables");
            return SubmitOutcome::Complete {
                fingerprint,
                tables,
            };
        }

        if artifacts.is_empty() || builds.is_empty() {
            let outcome = run_scoring(&artifacts, &builds, None, self.progress_batch, &mut NullSink);
            let tables = self
                .cache
                .store(set_id.clone(), fingerprint, outcome.tables);
            let mut record = RunRecord::new(RunState::Complete, 1.0, fingerprint);
            record.skipped = outcome.skipped;
            self.runs
                .lock()
                .expect("scoring runs mutex poisoned")
                .insert(set_id, record);
            return SubmitOutcome::Complete {
                fingerprint,
                tables,
            };
        }

        {
            let mut runs = self.runs.lock().expect("scoring runs mutex poisoned");
            if let Some(record) = runs.get(&set_id) {
                if record.state == RunState::Running && record.fingerprint == fingerprint {
                    return SubmitOutcome::AlreadyRunning { fingerprint };
                }
            }
            // A differing fingerprint supersedes: the record is repointed and
            // the stale run's updates will no longer match it.
            runs.insert(
                set_id.clone(),
                RunRecord::new(RunState::Running, 0.0, fingerprint),
            );
        }

        info!(
            set = %set_id.0,
            artifacts = artifacts.len(),
            builds = builds.len(),
            %fingerprint,
            "scoring run started"
        );

        // Rarity only depends on the artifacts, which are immutable per set
        // id: any earlier result for this set seeds it.
        let rarity_seed = self.cache.rarity_for(&set_id);
        let mut rx = spawn_scoring(artifacts, builds, rarity_seed, self.progress_batch);
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut finished = false;
            while let Some(update) = rx.recv().await {
                match update {
                    ScoringUpdate::Progress(fraction) => {
                        service.apply_progress(&set_id, fingerprint, fraction);
                    }
                    ScoringUpdate::Finished(outcome) => {
                        finished = true;
                        service.apply_outcome(&set_id, outcome);
                    }
                }
            }
            if !finished {
                service.mark_failed(&set_id, fingerprint);
            }
        });

        SubmitOutcome::Started { fingerprint }
    }

    /// Current run snapshot for an artifact set; completed runs carry their
    /// tables from the cache.
    pub fn status(&self, set_id: &ArtifactSetId) -> Option<RunStatusView> {
        let record = self
            .runs
            .lock()
            .expect("scoring runs mutex poisoned")
            .get(set_id)?
            .clone();
        let results = match record.state {
            RunState::Complete => self
                .cache
                .lookup(set_id, record.fingerprint)
                .map(|tables| (*tables).clone()),
            _ => None,
        };
        Some(RunStatusView {
            state: record.state,
            progress: record.progress,
            fingerprint: record.fingerprint.to_string(),
            started_at: record.started_at,
            skipped: record.skipped,
            results,
        })
    }

    /// Raise the recorded progress for a run, ignoring updates from
    /// superseded fingerprints and never letting the fraction regress.
    pub(crate) fn apply_progress(
        &self,
        set_id: &ArtifactSetId,
        fingerprint: BuildFingerprint,
        fraction: f64,
    ) {
        let mut runs = self.runs.lock().expect("scoring runs mutex poisoned");
        if let Some(record) = runs.get_mut(set_id) {
            if record.fingerprint == fingerprint
                && record.state == RunState::Running
                && fraction > record.progress
            {
                record.progress = fraction.min(1.0);
            }
        }
    }

    /// Apply a finished run. The tables are always memoized under their own
    /// fingerprint; the run record is only completed when the outcome's
    /// fingerprint still matches the one expected at receipt time.
    pub(crate) fn apply_outcome(&self, set_id: &ArtifactSetId, outcome: ScoringOutcome) {
        let ScoringOutcome {
            fingerprint,
            tables,
            skipped,
        } = outcome;
        self.cache.store(set_id.clone(), fingerprint, tables);

        let mut runs = self.runs.lock().expect("scoring runs mutex poisoned");
        match runs.get_mut(set_id) {
            Some(record) if record.fingerprint == fingerprint => {
                record.state = RunState::Complete;
                record.progress = 1.0;
                record.skipped = skipped;
                info!(set = %set_id.0, %fingerprint, "scoring run complete");
            }
            _ => {
                debug!(set = %set_id.0, %fingerprint, "discarding superseded scoring result");
            }
        }
    }

    /// Terminal bookkeeping for a run that died without delivering an
    /// outcome. Progress still reaches 1.0 so no collaborator waits forever.
    pub(crate) fn mark_failed(&self, set_id: &ArtifactSetId, fingerprint: BuildFingerprint) {
        let mut runs = self.runs.lock().expect("scoring runs mutex poisoned");
        if let Some(record) = runs.get_mut(set_id) {
            if record.fingerprint == fingerprint && record.state == RunState::Running {
                record.state = RunState::Failed;
                record.progress = 1.0;
                warn!(set = %set_id.0, %fingerprint, "scoring run failed without a result");
            }
        }
    }
}
