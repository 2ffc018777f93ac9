//! Duplicate resolution over a catalog.
//!
//! The resolver never touches the filesystem. It returns a
//! [`RemovalPlan`] naming one loser and one winner per duplicate pair;
//! the caller decides whether marks become deletions.

use crate::catalog::Catalog;
use crate::fingerprint::ContentHash;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;

/// Strategy for finding duplicates within one catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// Partition by content hash, keep the single latest-modified record
    /// per group. Transitive by construction.
    Grouped,
    /// Compatibility mode matching the historical tool: compare every
    /// unordered pair and skip pairs where either member is already
    /// marked. Non-transitive clusters may keep more than one winner.
    Pairwise,
}

/// One resolution decision: the record at `loser` is superseded by the
/// record at `winner`. Indices refer to the catalog passed to [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub loser: usize,
    pub winner: usize,
}

/// Marks produced by one resolver pass. Write-once per record: a marked
/// record is never unmarked within a run.
#[derive(Debug, Default)]
pub struct RemovalPlan {
    marked: Vec<bool>,
    removals: Vec<Removal>,
}

impl RemovalPlan {
    fn with_capacity(len: usize) -> Self {
        Self {
            marked: vec![false; len],
            removals: Vec::new(),
        }
    }

    fn mark(&mut self, loser: usize, winner: usize) {
        debug_assert!(!self.marked[loser]);
        self.marked[loser] = true;
        self.removals.push(Removal { loser, winner });
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.get(index).copied().unwrap_or(false)
    }

    /// Decisions in the deterministic order they were made.
    pub fn removals(&self) -> &[Removal] {
        &self.removals
    }

    pub fn marked_count(&self) -> usize {
        self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }
}

/// Resolves duplicates in `catalog`, marking all but one member of each
/// duplicate group. The later-modified record always wins; a tie in
/// modification time keeps the earlier-enumerated record.
pub fn resolve(catalog: &Catalog, mode: ResolveMode) -> RemovalPlan {
    match mode {
        ResolveMode::Grouped => resolve_grouped(catalog),
        ResolveMode::Pairwise => resolve_pairwise(catalog),
    }
}

fn resolve_pairwise(catalog: &Catalog) -> RemovalPlan {
    let mut plan = RemovalPlan::with_capacity(catalog.len());
    for first in 0..catalog.len() {
        for second in (first + 1)..catalog.len() {
            if plan.is_marked(first) || plan.is_marked(second) {
                continue;
            }
            if !catalog[first].is_duplicate_of(&catalog[second]) {
                continue;
            }
            if catalog[second].modified > catalog[first].modified {
                plan.mark(first, second);
            } else {
                plan.mark(second, first);
            }
        }
    }
    plan
}

fn resolve_grouped(catalog: &Catalog) -> RemovalPlan {
    let mut plan = RemovalPlan::with_capacity(catalog.len());

    // Group order follows first occurrence so the plan is deterministic.
    let mut order: Vec<ContentHash> = Vec::new();
    let mut groups: FxHashMap<ContentHash, Vec<usize>> = FxHashMap::default();
    for (index, record) in catalog.iter().enumerate() {
        let members = groups.entry(record.content_hash).or_insert_with(|| {
            order.push(record.content_hash);
            Vec::new()
        });
        members.push(index);
    }

    for hash in order {
        let members = &groups[&hash];
        if members.len() < 2 {
            continue;
        }
        let winner = members
            .iter()
            .copied()
            .max_by_key(|&index| (catalog[index].modified, Reverse(index)))
            .unwrap_or(members[0]);
        for &loser in members {
            if loser != winner {
                plan.mark(loser, winner);
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{ImageRecord, HASH_LENGTH};
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn record(path: &str, hash_byte: u8, modified_secs: u64) -> ImageRecord {
        ImageRecord {
            path: PathBuf::from(path),
            format: String::from("png"),
            width: 1920,
            height: 1080,
            content_hash: [hash_byte; HASH_LENGTH],
            file_size: 4096,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(modified_secs),
        }
    }

    fn assert_marked_never_newer(catalog: &Catalog, plan: &RemovalPlan) {
        for removal in plan.removals() {
            assert!(
                catalog[removal.loser].modified <= catalog[removal.winner].modified,
                "marked record must not be newer than the kept one"
            );
        }
    }

    #[test]
    fn marks_earlier_modified_member_of_a_pair() {
        let catalog = vec![record("/t/a.png", 1, 100), record("/t/b.png", 1, 200)];
        for mode in [ResolveMode::Grouped, ResolveMode::Pairwise] {
            let plan = resolve(&catalog, mode);
            assert_eq!(plan.marked_count(), 1);
            assert_eq!(plan.removals()[0], Removal { loser: 0, winner: 1 });
            assert_marked_never_newer(&catalog, &plan);
        }
    }

    #[test]
    fn marks_later_enumerated_member_on_modification_time_tie() {
        let catalog = vec![record("/t/a.png", 1, 100), record("/t/b.png", 1, 100)];
        for mode in [ResolveMode::Grouped, ResolveMode::Pairwise] {
            let plan = resolve(&catalog, mode);
            assert_eq!(plan.removals(), [Removal { loser: 1, winner: 0 }]);
        }
    }

    #[test]
    fn distinct_images_are_untouched() {
        let catalog = vec![
            record("/t/a.png", 1, 100),
            record("/t/b.png", 2, 100),
            record("/t/c.png", 3, 100),
        ];
        for mode in [ResolveMode::Grouped, ResolveMode::Pairwise] {
            assert!(resolve(&catalog, mode).is_empty());
        }
    }

    #[test]
    fn grouped_keeps_exactly_one_per_cluster() {
        let catalog = vec![
            record("/t/a.png", 7, 300),
            record("/t/b.png", 7, 100),
            record("/t/c.png", 7, 200),
            record("/t/d.png", 9, 100),
        ];
        let plan = resolve(&catalog, ResolveMode::Grouped);
        assert_eq!(plan.marked_count(), 2);
        assert!(!plan.is_marked(0), "latest-modified member is kept");
        assert!(plan.is_marked(1));
        assert!(plan.is_marked(2));
        assert!(!plan.is_marked(3));
        assert_marked_never_newer(&catalog, &plan);
    }

    #[test]
    fn pairwise_resolves_a_three_member_cluster_to_one_winner() {
        // Hash-equal clusters are transitive, so pairwise matches grouped.
        let catalog = vec![
            record("/t/a.png", 7, 100),
            record("/t/b.png", 7, 300),
            record("/t/c.png", 7, 200),
        ];
        let plan = resolve(&catalog, ResolveMode::Pairwise);
        assert_eq!(plan.marked_count(), 2);
        assert!(!plan.is_marked(1));
        assert_marked_never_newer(&catalog, &plan);
    }

    #[test]
    fn pairwise_skips_pairs_with_an_already_marked_member() {
        // a == b via the path short-circuit, a == c via content, b != c.
        // Once 'a' loses to 'b' the (a, c) pair is skipped, so 'c'
        // survives even though it duplicates a's content. Grouped mode
        // does not have this gap.
        let a = record("/t/same.png", 1, 100);
        let mut b = record("/t/same.png", 2, 200);
        b.file_size = 1;
        let c = record("/t/other.png", 1, 50);
        let catalog = vec![a, b, c];
        let plan = resolve(&catalog, ResolveMode::Pairwise);
        assert!(plan.is_marked(0));
        assert!(!plan.is_marked(1));
        assert!(!plan.is_marked(2));
        assert_eq!(plan.marked_count(), 1);

        let grouped = resolve(&catalog, ResolveMode::Grouped);
        assert!(grouped.is_marked(2), "hash grouping resolves the cluster");
        assert_eq!(grouped.marked_count(), 1);
    }

    #[test]
    fn grouped_partitions_by_content_hash_only() {
        // Same path but different content: pairwise would pair them via
        // the path short-circuit, grouped keeps them apart.
        let a = record("/t/same.png", 1, 100);
        let b = record("/t/same.png", 2, 200);
        let catalog = vec![a, b];
        assert!(resolve(&catalog, ResolveMode::Grouped).is_empty());
        assert_eq!(resolve(&catalog, ResolveMode::Pairwise).marked_count(), 1);
    }

    #[test]
    fn empty_catalog_produces_empty_plan() {
        let catalog: Catalog = Vec::new();
        for mode in [ResolveMode::Grouped, ResolveMode::Pairwise] {
            assert!(resolve(&catalog, mode).is_empty());
        }
    }

    #[test]
    fn modification_time_never_affects_equality() {
        let catalog = vec![record("/t/a.png", 1, 100), record("/t/b.png", 1, 999_999)];
        let plan = resolve(&catalog, ResolveMode::Pairwise);
        assert_eq!(plan.marked_count(), 1);
    }
}
