//! Resolving provider team ids to persisted teams.

use std::collections::HashMap;

use crate::entity::provider::Provider;
use crate::entity::team;
use crate::identity::extract_external_ids;

/// `provider -> (external team id -> team)`, built once per sync run.
#[derive(Debug, Clone, Default)]
pub struct TeamLookup {
    teams: Vec<team::Model>,
    index: HashMap<(Provider, i64), usize>,
}

impl TeamLookup {
    /// Index persisted teams by every provider id they carry.
    ///
    /// Teams with an unreadable id payload are still kept (they just can't be
    /// resolved). When two teams claim the same provider id, the first wins.
    pub fn from_teams(teams: &[team::Model]) -> Self {
        let mut index: HashMap<(Provider, i64), usize> = HashMap::new();
        for (position, team) in teams.iter().enumerate() {
            let ids = match extract_external_ids(&team.external_ids) {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!(team = %team.full_name, error = %e, "Team has no readable external ids");
                    continue;
                }
            };
            for ext in ids {
                if let Some(&first) = index.get(&(ext.provider, ext.id)) {
                    tracing::warn!(
                        external_id = %ext,
                        kept = %teams[first].full_name,
                        ignored = %team.full_name,
                        "Two teams claim the same provider id"
                    );
                    continue;
                }
                index.insert((ext.provider, ext.id), position);
            }
        }

        Self {
            teams: teams.to_vec(),
            index,
        }
    }

    /// The persisted team a provider's team id refers to.
    pub fn resolve(&self, provider: Provider, external_id: i64) -> Option<&team::Model> {
        self.index
            .get(&(provider, external_id))
            .and_then(|&i| self.teams.get(i))
    }

    /// Every team id this provider has, ascending.
    pub fn external_ids(&self, provider: Provider) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .index
            .keys()
            .filter(|(p, _)| *p == provider)
            .map(|(_, id)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn teams(&self) -> &[team::Model] {
        &self.teams
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
