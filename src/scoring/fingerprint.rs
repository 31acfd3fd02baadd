use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::domain::BuildMap;

/// Content-derived key summarizing an enabled-build configuration.
///
/// Process-memory-only: it keys the result cache and tags in-flight runs so
/// stale results can be discarded. Two structurally identical build maps
/// fingerprint identically regardless of how they were assembled, because
/// `BuildMap` and the nested collections are ordered maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildFingerprint(u64);

impl fmt::Display for BuildFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Fingerprint the ingredients that affect fitness: build keys, weight
/// vectors, and main-stat filters. The artifact list is deliberately not an
/// ingredient; it is keyed separately by the collaborator's set id.
pub fn fingerprint_builds(builds: &BuildMap) -> BuildFingerprint {
    let mut hasher = DefaultHasher::new();
    builds.len().hash(&mut hasher);
    for (key, build) in builds {
        key.hash(&mut hasher);
        build.weights.len().hash(&mut hasher);
        for (kind, weight) in &build.weights {
            kind.hash(&mut hasher);
            weight.to_bits().hash(&mut hasher);
        }
        build.main_stats.len().hash(&mut hasher);
        for (position, allowed) in &build.main_stats {
            position.hash(&mut hasher);
            allowed.len().hash(&mut hasher);
            for kind in allowed {
                kind.hash(&mut hasher);
            }
        }
    }
    BuildFingerprint(hasher.finish())
}
