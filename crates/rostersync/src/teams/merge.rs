//! Merging team records and their external-id payloads.

use serde_json::{Map, Value};

use crate::provider::TeamRecord;

/// Which side wins when both payloads hold a different scalar for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
    KeepExisting,
    TakeIncoming,
}

fn find_key_ignore_case(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.keys().find(|k| k.eq_ignore_ascii_case(key)).cloned()
}

/// Merge `incoming` into `target` key by key, recursing into nested objects.
///
/// Keys compare case-insensitively; the spelling already in `target` is kept.
/// Returns whether `target` changed.
fn merge_maps(target: &mut Map<String, Value>, incoming: &Map<String, Value>, on_conflict: Conflict) -> bool {
    let mut changed = false;
    for (key, value) in incoming {
        let Some(existing_key) = find_key_ignore_case(target, key) else {
            target.insert(key.clone(), value.clone());
            changed = true;
            continue;
        };
        let Some(existing) = target.get_mut(&existing_key) else {
            continue;
        };
        match (existing, value) {
            (Value::Object(existing), Value::Object(value)) => {
                changed |= merge_maps(existing, value, on_conflict);
            }
            (existing, value) if *existing != *value && on_conflict == Conflict::TakeIncoming => {
                *existing = value.clone();
                changed = true;
            }
            _ => {}
        }
    }
    changed
}

/// Merge `incoming` into `target`; values already in `target` win.
///
/// A payload that isn't an object contributes nothing.
pub fn deep_merge_ids(target: &mut Map<String, Value>, incoming: &Value) {
    match incoming {
        Value::Object(incoming) => {
            merge_maps(target, incoming, Conflict::KeepExisting);
        }
        other => tracing::warn!(payload = %other, "Ignoring malformed external id payload during team merge"),
    }
}

/// Fold newly fetched ids into a persisted payload, fetched values winning.
///
/// Returns the new payload when anything was added or changed, `None`
/// otherwise (including when `incoming` isn't an object).
pub fn absorb_external_ids(existing: &Value, incoming: &Value) -> Option<Value> {
    let Value::Object(incoming) = incoming else {
        tracing::warn!(payload = %incoming, "Ignoring malformed external id payload");
        return None;
    };
    let mut merged = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    merge_maps(&mut merged, incoming, Conflict::TakeIncoming).then_some(Value::Object(merged))
}

pub(super) fn fill(target: &mut String, candidate: &str) {
    if target.trim().is_empty() && !candidate.trim().is_empty() {
        *target = candidate.to_string();
    }
}

pub(super) fn fill_opt(target: &mut Option<String>, candidate: &Option<String>) {
    let empty = target.as_deref().is_none_or(|s| s.trim().is_empty());
    if empty && let Some(value) = candidate.as_deref().filter(|s| !s.trim().is_empty()) {
        *target = Some(value.to_string());
    }
}

/// Merge a cluster into one record, in member order.
///
/// Every field takes the first non-empty value; the anchor's values are
/// never overwritten. External ids merge with [`deep_merge_ids`].
pub fn merge_cluster<'a>(members: impl IntoIterator<Item = &'a TeamRecord>) -> Option<TeamRecord> {
    let mut members = members.into_iter();
    let anchor = members.next()?;

    let mut merged = anchor.clone();
    let mut ids = Map::new();
    deep_merge_ids(&mut ids, &anchor.external_ids);

    for team in members {
        fill(&mut merged.full_name, &team.full_name);
        fill(&mut merged.name, &team.name);
        fill(&mut merged.abbreviation, &team.abbreviation);
        fill_opt(&mut merged.city, &team.city);
        fill_opt(&mut merged.conference, &team.conference);
        fill_opt(&mut merged.division, &team.division);
        fill_opt(&mut merged.logo_url, &team.logo_url);
        fill_opt(&mut merged.nickname, &team.nickname);
        deep_merge_ids(&mut ids, &team.external_ids);
    }

    merged.external_ids = Value::Object(ids);
    Some(merged)
}
