//! Deciding what one provider's fetched players mean for the store.
//!
//! Everything here is pure: the engine loads the persisted players, calls
//! [`reconcile_players`], and writes the result.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::entity::player;
use crate::entity::provider::Provider;
use crate::identity::{extract_external_ids, external_id_for};
use crate::provider::PlayerRecord;
use crate::store::{CATEGORY_IDENTITY, CATEGORY_TEAM_RESOLUTION, HistoryEntry};

use super::lookup::TeamLookup;

/// A non-fatal problem worth persisting as a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: &'static str,
    pub message: String,
    pub context: Option<String>,
}

/// Seasonal observations of one player, grouped by `(provider, id)`.
#[derive(Debug, Default)]
pub struct GroupedVersions {
    /// `(provider, external id)` -> versions in fetch order.
    pub groups: BTreeMap<(Provider, i64), Vec<PlayerRecord>>,
    /// Rows whose id payload couldn't be read.
    pub diagnostics: Vec<Diagnostic>,
    /// Rows dropped as repeats of an already seen `(provider, id, season)`.
    pub duplicates: usize,
}

/// Group rows by every `(provider, id)` they carry.
///
/// A row repeating a `(provider, id, season)` already seen is dropped; the
/// first one wins. A row with an unreadable payload is left out entirely.
pub fn group_versions(rows: Vec<PlayerRecord>) -> GroupedVersions {
    let mut grouped = GroupedVersions::default();
    let mut seen: HashSet<(Provider, i64, i32)> = HashSet::new();

    for row in rows {
        let ids = match extract_external_ids(&row.external_ids) {
            Ok(ids) => ids,
            Err(e) => {
                let name = format!("{} {}", row.first_name, row.last_name);
                tracing::warn!(
                    provider = %row.provider,
                    player = %name,
                    error = %e,
                    "Player has no readable external ids; skipping"
                );
                grouped.diagnostics.push(Diagnostic {
                    category: CATEGORY_IDENTITY,
                    message: format!("{name}: {e}"),
                    context: Some(row.external_ids.to_string()),
                });
                continue;
            }
        };

        for ext in ids {
            if !seen.insert((ext.provider, ext.id, row.season)) {
                grouped.duplicates += 1;
                continue;
            }
            grouped
                .groups
                .entry((ext.provider, ext.id))
                .or_default()
                .push(row.clone());
        }
    }

    grouped
}

/// The version with the greatest season; ties go to the last one seen.
pub fn authoritative(versions: &[PlayerRecord]) -> Option<&PlayerRecord> {
    versions.iter().max_by_key(|v| v.season)
}

/// The persisted team a version's team id resolves to.
fn resolve_team(lookup: &TeamLookup, record: &PlayerRecord) -> Option<Uuid> {
    record
        .team_external_id
        .and_then(|id| lookup.resolve(record.provider, id))
        .map(|team| team.id)
}

fn new_player(record: &PlayerRecord, team_id: Option<Uuid>, now: DateTime<FixedOffset>) -> player::Model {
    player::Model {
        id: Uuid::new_v4(),
        provider: record.provider,
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        position: record.position.clone(),
        height: record.height.clone(),
        weight: record.weight,
        jersey_number: record.jersey_number.clone(),
        college: record.college.clone(),
        country: record.country.clone(),
        draft_year: record.draft_year,
        draft_round: record.draft_round,
        draft_number: record.draft_number,
        is_active: record.is_active,
        start_year: record.start_year,
        season: record.season,
        current_team_id: team_id,
        external_ids: record.external_ids.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// Whether any diffable field of `existing` differs from `record`.
///
/// Draft details and the season itself are not compared.
pub fn player_changed(existing: &player::Model, record: &PlayerRecord, team_id: Option<Uuid>) -> bool {
    existing.first_name != record.first_name
        || existing.last_name != record.last_name
        || existing.position != record.position
        || existing.height != record.height
        || existing.weight != record.weight
        || existing.college != record.college
        || existing.country != record.country
        || existing.current_team_id != team_id
        || existing.is_active != record.is_active
        || existing.start_year != record.start_year
        || existing.jersey_number != record.jersey_number
        || existing.external_ids != record.external_ids
}

fn apply_update(existing: &mut player::Model, record: &PlayerRecord, team_id: Option<Uuid>, now: DateTime<FixedOffset>) {
    existing.first_name = record.first_name.clone();
    existing.last_name = record.last_name.clone();
    existing.position = record.position.clone();
    existing.height = record.height.clone();
    existing.weight = record.weight;
    existing.college = record.college.clone();
    existing.country = record.country.clone();
    existing.current_team_id = team_id;
    existing.is_active = record.is_active;
    existing.start_year = record.start_year;
    existing.jersey_number = record.jersey_number.clone();
    existing.external_ids = record.external_ids.clone();
    existing.season = record.season;
    existing.updated_at = now;
}

/// Everything player sync decided for one provider.
#[derive(Debug, Default)]
pub struct ProviderReconciliation {
    pub new_players: Vec<player::Model>,
    pub updated_players: Vec<player::Model>,
    /// Persisted players left alone.
    pub unchanged: usize,
    /// The grouped versions the decisions were made from.
    pub versions: BTreeMap<i64, Vec<PlayerRecord>>,
    /// History rows to append, deduplicated.
    pub history: Vec<HistoryEntry>,
    pub warnings: Vec<Diagnostic>,
}

/// Inputs that stay fixed across one provider's reconciliation.
pub struct ReconcileContext<'a> {
    pub provider: Provider,
    pub lookup: &'a TeamLookup,
    pub existence_only: bool,
    pub now: DateTime<FixedOffset>,
}

/// External ids this provider's groups carry, for loading persisted players.
pub fn own_external_ids(grouped: &GroupedVersions, provider: Provider) -> Vec<i64> {
    grouped
        .groups
        .keys()
        .filter(|(p, _)| *p == provider)
        .map(|(_, id)| *id)
        .collect()
}

/// Diff grouped versions against persisted players and derive history.
///
/// Only groups keyed by `ctx.provider` are considered. `existing` are the
/// persisted players for those ids.
pub fn reconcile_players(
    ctx: &ReconcileContext<'_>,
    grouped: GroupedVersions,
    existing: Vec<player::Model>,
) -> ProviderReconciliation {
    let provider = ctx.provider;
    let mut result = ProviderReconciliation {
        warnings: grouped.diagnostics,
        ..ProviderReconciliation::default()
    };

    let mut existing_by_id: HashMap<i64, player::Model> = HashMap::new();
    for model in existing {
        match external_id_for(&model.external_ids, provider) {
            Some(id) => {
                existing_by_id.insert(id, model);
            }
            None => tracing::warn!(player = %model.id, "Persisted player has no readable id for its provider"),
        }
    }

    let mut history: BTreeSet<HistoryEntry> = BTreeSet::new();

    for ((group_provider, external_id), versions) in grouped.groups {
        if group_provider != provider {
            continue;
        }
        let Some(latest) = authoritative(&versions) else {
            continue;
        };

        let team_id = resolve_team(ctx.lookup, latest);
        if team_id.is_none() {
            let message = format!(
                "{} {} ({provider}:{external_id}): team {} not found",
                latest.first_name,
                latest.last_name,
                latest.team_external_id.map_or_else(|| "none".to_string(), |t| t.to_string()),
            );
            tracing::warn!(%message, "Player left unassigned");
            result.warnings.push(Diagnostic {
                category: CATEGORY_TEAM_RESOLUTION,
                message,
                context: Some(provider.to_string()),
            });
        }

        let player_id = match existing_by_id.remove(&external_id) {
            None => {
                let model = new_player(latest, team_id, ctx.now);
                let id = model.id;
                tracing::debug!(%provider, external_id, "New player");
                result.new_players.push(model);
                id
            }
            Some(_) if ctx.existence_only => {
                result.unchanged += 1;
                result.versions.insert(external_id, versions);
                continue;
            }
            Some(mut model) => {
                let id = model.id;
                if !player_changed(&model, latest, team_id) {
                    result.unchanged += 1;
                } else {
                    apply_update(&mut model, latest, team_id, ctx.now);
                    tracing::debug!(%provider, external_id, "Player changed");
                    result.updated_players.push(model);
                }
                id
            }
        };

        for version in &versions {
            if std::ptr::eq(version, latest) {
                continue;
            }
            let Some(past_team) = resolve_team(ctx.lookup, version) else {
                continue;
            };
            if Some(past_team) != team_id {
                history.insert(HistoryEntry {
                    player_id,
                    team_id: past_team,
                    season: version.season,
                });
            }
        }

        result.versions.insert(external_id, versions);
    }

    result.history = history.into_iter().collect();
    result
}
