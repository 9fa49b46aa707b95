//! Comparing canonical teams against the persisted ones.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::entity::team;
use crate::provider::TeamRecord;

use super::merge::{absorb_external_ids, fill, fill_opt};

/// Teams to insert and teams to update, ready for the store.
#[derive(Debug, Default)]
pub struct TeamDiff {
    pub new: Vec<team::Model>,
    pub updated: Vec<team::Model>,
    pub unchanged: usize,
}

fn new_team(record: TeamRecord, now: DateTime<FixedOffset>) -> team::Model {
    team::Model {
        id: Uuid::new_v4(),
        city: record.city,
        name: record.name,
        full_name: record.full_name,
        abbreviation: record.abbreviation,
        conference: record.conference,
        division: record.division,
        logo_url: record.logo_url,
        nickname: record.nickname,
        external_ids: record.external_ids,
        created_at: now,
        updated_at: now,
    }
}

/// Apply a fetched record to a team row. Only ids and empty display fields
/// are touched.
fn apply(existing: &mut team::Model, record: &TeamRecord) {
    if let Some(ids) = absorb_external_ids(&existing.external_ids, &record.external_ids) {
        existing.external_ids = ids;
    }
    fill(&mut existing.name, &record.name);
    fill(&mut existing.abbreviation, &record.abbreviation);
    fill_opt(&mut existing.city, &record.city);
    fill_opt(&mut existing.conference, &record.conference);
    fill_opt(&mut existing.division, &record.division);
    fill_opt(&mut existing.logo_url, &record.logo_url);
    fill_opt(&mut existing.nickname, &record.nickname);
}

/// Where a team key points: a persisted row or a team created this pass.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Existing(usize),
    New(usize),
}

/// Diff canonical teams against persisted ones.
///
/// Teams match by abbreviation (ignoring case), falling back to full name.
/// A record matching nothing is new. A record matching a persisted row
/// updates it only when it contributes a new or changed id, or fills an empty
/// display field. Several records for the same team fold into one row.
pub fn diff_teams(
    incoming: Vec<TeamRecord>,
    existing: &[team::Model],
    now: DateTime<FixedOffset>,
) -> TeamDiff {
    let mut by_abbreviation: HashMap<String, Slot> = HashMap::new();
    let mut by_full_name: HashMap<String, Slot> = HashMap::new();
    for (index, team) in existing.iter().enumerate() {
        if !team.abbreviation.trim().is_empty() {
            by_abbreviation.insert(team.abbreviation.to_lowercase(), Slot::Existing(index));
        }
        by_full_name.insert(team.full_name.to_lowercase(), Slot::Existing(index));
    }

    let mut diff = TeamDiff::default();
    let mut touched: Vec<Option<team::Model>> = vec![None; existing.len()];

    for record in incoming {
        let abbreviation = record.abbreviation.trim().to_lowercase();
        let full_name = record.full_name.trim().to_lowercase();
        let matched = by_abbreviation
            .get(&abbreviation)
            .filter(|_| !abbreviation.is_empty())
            .or_else(|| by_full_name.get(&full_name))
            .copied();

        match matched {
            Some(Slot::New(slot)) => {
                apply(&mut diff.new[slot], &record);
            }
            Some(Slot::Existing(index)) => {
                let team = touched[index].get_or_insert_with(|| existing[index].clone());
                apply(team, &record);
            }
            None => {
                let slot = Slot::New(diff.new.len());
                if !abbreviation.is_empty() {
                    by_abbreviation.insert(abbreviation, slot);
                }
                by_full_name.insert(full_name, slot);
                diff.new.push(new_team(record, now));
            }
        }
    }

    for (original, candidate) in existing.iter().zip(touched) {
        let Some(mut team) = candidate else {
            continue;
        };
        if team == *original {
            diff.unchanged += 1;
        } else {
            team.updated_at = now;
            diff.updated.push(team);
        }
    }

    diff
}
