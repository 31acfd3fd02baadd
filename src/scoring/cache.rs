use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{ArtifactSetId, RarityTable, ScoringTables};
use super::fingerprint::BuildFingerprint;

/// Memoized score tables keyed by (artifact-set id, build fingerprint).
///
/// No TTL and no size bound: entries live as long as the session's artifact
/// sets, bounded in practice by how many build configurations a user
/// toggles. Invalidation is implicit; a changed configuration simply keys a
/// new entry.
#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<ArtifactSetId, HashMap<BuildFingerprint, Arc<ScoringTables>>>>,
}

impl ResultCache {
    pub fn lookup(
        &self,
        set_id: &ArtifactSetId,
        fingerprint: BuildFingerprint,
    ) -> Option<Arc<ScoringTables>> {
        self.entries
            .lock()
            .expect("result cache mutex poisoned")
            .get(set_id)?
            .get(&fingerprint)
            .cloned()
    }

    /// Rarity is independent of the build configuration, so any entry for
    /// the set can seed the rarity side of a new run.
    pub fn rarity_for(&self, set_id: &ArtifactSetId) -> Option<RarityTable> {
        self.entries
            .lock()
            .expect("result cache mutex poisoned")
            .get(set_id)?
            .values()
            .map(|tables| &tables.all_rarity)
            .find(|rarity| !rarity.is_empty())
            .cloned()
    }

    pub fn store(
        &self,
        set_id: ArtifactSetId,
        fingerprint: BuildFingerprint,
        tables: ScoringTables,
    ) -> Arc<ScoringTables> {
        let shared = Arc::new(tables);
        self.entries
            .lock()
            .expect("result cache mutex poisoned")
            .entry(set_id)
            .or_default()
            .insert(fingerprint, Arc::clone(&shared));
        shared
    }
}
