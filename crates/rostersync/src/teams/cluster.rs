//! Grouping raw team records that name the same real team.

use crate::provider::TeamRecord;

use super::similarity::{combined_normalized, normalize_name};

/// Score a pair must beat (strictly) to land in the same cluster.
pub const DEFAULT_THRESHOLD: f64 = 90.0;

/// Partition team records into clusters of the same real-world team.
///
/// Returned clusters hold indices into `teams`; the first index of each
/// cluster is its anchor.
pub trait TeamClusterer: Send + Sync {
    fn cluster(&self, teams: &[TeamRecord]) -> Vec<Vec<usize>>;
}

/// Greedy single-link clustering over full names.
///
/// Each not-yet-visited record anchors a cluster and pulls in every later
/// unvisited record scoring above the threshold against it. The result
/// depends on input order.
#[derive(Debug, Clone, Copy)]
pub struct GreedyClusterer {
    pub threshold: f64,
}

impl Default for GreedyClusterer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl TeamClusterer for GreedyClusterer {
    fn cluster(&self, teams: &[TeamRecord]) -> Vec<Vec<usize>> {
        let names: Vec<String> = teams.iter().map(|t| normalize_name(&t.full_name)).collect();
        let mut visited = vec![false; teams.len()];
        let mut clusters = Vec::new();

        for anchor in 0..teams.len() {
            if visited[anchor] {
                continue;
            }
            visited[anchor] = true;
            let mut members = vec![anchor];

            for other in anchor + 1..teams.len() {
                if visited[other] {
                    continue;
                }
                let score = combined_normalized(&names[anchor], &names[other]);
                if score > self.threshold {
                    tracing::trace!(
                        anchor = %teams[anchor].full_name,
                        candidate = %teams[other].full_name,
                        score,
                        "Clustering teams"
                    );
                    visited[other] = true;
                    members.push(other);
                }
            }
            clusters.push(members);
        }

        clusters
    }
}
