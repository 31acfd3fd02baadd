use std::sync::Arc;

use super::common::*;
use crate::config::ScoringConfig;
use crate::scoring::cache::ResultCache;
use crate::scoring::domain::{ArtifactSetId, BuildMap, ScoringTables};
use crate::scoring::fingerprint::fingerprint_builds;
use crate::scoring::orchestrator::{RunState, ScoringOutcome};
use crate::scoring::service::{ScoringService, SubmitOutcome};
use crate::scoring::stats::StatKind;

#[test]
fn fingerprint_ignores_insertion_order() {
    let mut forward = BuildMap::new();
    forward.insert("alpha".to_string(), crit_build());
    forward.insert(
        "tank".to_string(),
        build_with_weights(&[(StatKind::DefPct, 1.0)]),
    );

    let mut reverse = BuildMap::new();
    reverse.insert(
        "tank".to_string(),
        build_with_weights(&[(StatKind::DefPct, 1.0)]),
    );
    reverse.insert("alpha".to_string(), crit_build());

    assert_eq!(fingerprint_builds(&forward), fingerprint_builds(&reverse));
}

#[test]
fn fingerprint_tracks_score_relevant_content() {
    let base = single_build("crit", crit_build());

    let mut reweighted = single_build("crit", crit_build());
    if let Some(build) = reweighted.get_mut("crit") {
        build.weights.insert(StatKind::CritDmg, 0.5);
    }
    assert_ne!(fingerprint_builds(&base), fingerprint_builds(&reweighted));

    let mut refiltered = single_build("crit", crit_build());
    if let Some(build) = refiltered.get_mut("crit") {
        restrict_main_stat(build, 4, &[StatKind::PyroDmg]);
    }
    assert_ne!(fingerprint_builds(&base), fingerprint_builds(&refiltered));

    let renamed = single_build("crit2", crit_build());
    assert_ne!(fingerprint_builds(&base), fingerprint_builds(&renamed));
}

#[test]
fn cache_memoizes_per_set_and_fingerprint() {
    let cache = ResultCache::default();
    let set = ArtifactSetId("upload-1".to_string());
    let other_set = ArtifactSetId("upload-2".to_string());
    let fingerprint = fingerprint_builds(&single_build("crit", crit_build()));

    assert!(cache.lookup(&set, fingerprint).is_none());

    let mut tables = ScoringTables::default();
    tables.all_rarity.insert(0, 7.5);
    let stored = cache.store(set.clone(), fingerprint, tables.clone());

    let found = cache.lookup(&set, fingerprint).expect("cached entry");
    assert_eq!(*found, tables);
    assert!(Arc::ptr_eq(&stored, &found));
    assert!(cache.lookup(&other_set, fingerprint).is_none());
}

#[test]
fn superseded_result_is_discarded_but_memoized() {
    let service = Arc::new(ScoringService::new(ScoringConfig::default()));
    let set = ArtifactSetId("upload-1".to_string());

    // Current configuration: no enabled builds, completed inline.
    let current = service.submit(set.clone(), Vec::new(), BuildMap::new());
    let current_fingerprint = match current {
        SubmitOutcome::Complete { fingerprint, .. } => fingerprint,
        other => panic!("expected inline completion, got {other:?}"),
    };

    // A stale run finishes for a configuration that is no longer current.
    let stale_builds = single_build("crit", crit_build());
    let mut stale_tables = ScoringTables::default();
    stale_tables.all_rarity.insert(0, 10.0);
    service.apply_outcome(
        &set,
        ScoringOutcome {
            fingerprint: fingerprint_builds(&stale_builds),
            tables: stale_tables.clone(),
            skipped: Vec::new(),
        },
    );

    // The run record still reflects the current configuration.
    let view = service.status(&set).expect("run recorded");
    assert_eq!(view.state, RunState::Complete);
    assert_eq!(view.fingerprint, current_fingerprint.to_string());
    assert!(view.results.expect("current results").is_empty());

    // The stale tables were still memoized under their own fingerprint, so
    // toggling to that configuration serves them from the cache.
    let artifact = five_star(2, StatKind::Atk, vec![stat(StatKind::CritDmg, 7.77)]);
    match service.submit(set, vec![artifact], stale_builds) {
        SubmitOutcome::Complete { tables, .. } => assert_eq!(*tables, stale_tables),
        other => panic!("expected cached completion, got {other:?}"),
    }
}

#[test]
fn progress_updates_never_touch_settled_runs() {
    let service = Arc::new(ScoringService::new(ScoringConfig::default()));
    let set = ArtifactSetId("upload-1".to_string());

    let fingerprint = match service.submit(set.clone(), Vec::new(), BuildMap::new()) {
        SubmitOutcome::Complete { fingerprint, .. } => fingerprint,
        other => panic!("expected inline completion, got {other:?}"),
    };

    service.apply_progress(&set, fingerprint, 0.5);

    let view = service.status(&set).expect("run recorded");
    assert_eq!(view.progress, 1.0);
}
