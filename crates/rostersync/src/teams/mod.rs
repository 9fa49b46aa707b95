//! Team deduplication across providers.
//!
//! Raw team records from every provider go through three steps before they
//! are compared with the store:
//!
//! 1. [`cluster`]: fuzzy-group records naming the same real team.
//! 2. [`merge`]: fold each cluster into one record carrying every provider id.
//! 3. [`canonical`]: rewrite onto the fixed franchise list, dropping the rest.
//!
//! [`diff`] then decides which canonical teams are new and which update a
//! persisted row.

pub mod canonical;
pub mod cluster;
pub mod diff;
pub mod merge;
pub mod similarity;

pub use canonical::{canonical_full_name, canonicalize, canonicalize_all, expand_city};
pub use cluster::{GreedyClusterer, TeamClusterer};
pub use diff::{TeamDiff, diff_teams};
pub use merge::{absorb_external_ids, deep_merge_ids, merge_cluster};
pub use similarity::combined_score;

use std::collections::HashMap;

use crate::provider::TeamRecord;

/// Cluster raw records and merge each cluster into one team.
pub fn merge_teams(raw: &[TeamRecord], clusterer: &dyn TeamClusterer) -> Vec<TeamRecord> {
    clusterer
        .cluster(raw)
        .into_iter()
        .filter_map(|members| merge_cluster(members.iter().map(|&i| &raw[i])))
        .collect()
}

/// Canonicalize merged teams, drop non-franchises, and fold together
/// clusters that land on the same franchise.
///
/// The fuzzy matcher can keep apart spellings that canonicalize to one team
/// ("GSW" and "Golden State Warriors"); the output holds at most one record
/// per franchise.
pub fn collapse_canonical(merged: Vec<TeamRecord>) -> Vec<TeamRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<TeamRecord>> = HashMap::new();
    for team in canonicalize_all(merged) {
        let key = team.full_name.clone();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(team);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter_map(|group| merge_cluster(group.iter()))
        .collect()
}

/// Output of [`prepare_teams`].
#[derive(Debug, Clone, Default)]
pub struct PreparedTeams {
    /// Merged records before canonical filtering.
    pub merged: usize,
    pub teams: Vec<TeamRecord>,
}

/// Merge, canonicalize and filter one pass worth of raw team records.
pub fn prepare_teams(raw: &[TeamRecord], clusterer: &dyn TeamClusterer) -> PreparedTeams {
    let merged = merge_teams(raw, clusterer);
    PreparedTeams {
        merged: merged.len(),
        teams: collapse_canonical(merged),
    }
}
