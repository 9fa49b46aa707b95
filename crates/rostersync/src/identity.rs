//! Reading and writing external-id payloads.
//!
//! Teams and players carry a JSON payload mapping provider names to an object
//! with at least an integer `id`:
//!
//! ```json
//! { "balldontlie": { "id": 14 }, "nba_api": { "id": 17 } }
//! ```
//!
//! Providers have historically written these keys with inconsistent casing,
//! so lookups go through [`Provider::from_key`]. Keys for providers we don't
//! know are ignored on read.

use serde_json::{Map, Value};

use crate::entity::provider::Provider;

/// One provider-issued identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalId {
    pub provider: Provider,
    pub id: i64,
}

impl ExternalId {
    pub fn new(provider: Provider, id: i64) -> Self {
        Self { provider, id }
    }
}

impl std::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider, self.id)
    }
}

/// The payload as a whole could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("external id payload is missing")]
    Missing,

    #[error("external id payload is not an object (got {found})")]
    Malformed { found: &'static str },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read an `id` field, accepting integers and decimal-digit strings.
fn parse_id(entry: &Value) -> Option<i64> {
    match entry.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract every `(provider, id)` pair from a payload.
///
/// Entries with an unknown provider key or an unreadable `id` are skipped one
/// at a time; only a payload that isn't an object at all is an error.
pub fn extract_external_ids(payload: &Value) -> Result<Vec<ExternalId>, IdentityError> {
    let map = match payload {
        Value::Object(map) => map,
        Value::Null => return Err(IdentityError::Missing),
        other => {
            return Err(IdentityError::Malformed {
                found: json_kind(other),
            });
        }
    };

    let mut ids = Vec::with_capacity(map.len());
    for (key, entry) in map {
        let Some(provider) = Provider::from_key(key) else {
            continue;
        };
        match parse_id(entry) {
            Some(id) => ids.push(ExternalId::new(provider, id)),
            None => tracing::debug!(provider = %provider, entry = %entry, "Skipping unreadable external id"),
        }
    }
    Ok(ids)
}

/// The id a single provider assigned, if the payload carries a readable one.
pub fn external_id_for(payload: &Value, provider: Provider) -> Option<i64> {
    extract_external_ids(payload)
        .ok()?
        .into_iter()
        .find(|ext| ext.provider == provider)
        .map(|ext| ext.id)
}

/// Build the payload for a record that only one provider knows about.
pub fn payload_for(provider: Provider, id: i64) -> Value {
    let mut entry = Map::new();
    entry.insert("id".to_string(), Value::from(id));
    let mut map = Map::new();
    map.insert(provider.as_str().to_string(), Value::Object(entry));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_every_known_provider() {
        let payload = json!({ "balldontlie": { "id": 14 }, "nba_api": { "id": 17 } });
        let mut ids = extract_external_ids(&payload).unwrap();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ExternalId::new(Provider::BallDontLie, 14),
                ExternalId::new(Provider::NbaApi, 17),
            ]
        );
    }

    #[test]
    fn provider_keys_are_case_insensitive() {
        let payload = json!({ "NBA_API": { "id": 5 } });
        assert_eq!(external_id_for(&payload, Provider::NbaApi), Some(5));
    }

    #[test]
    fn unknown_provider_keys_are_ignored() {
        let payload = json!({ "sportradar": { "id": 1 }, "nba_api": { "id": 2 } });
        assert_eq!(
            extract_external_ids(&payload).unwrap(),
            vec![ExternalId::new(Provider::NbaApi, 2)]
        );
    }

    #[test]
    fn unreadable_ids_are_skipped_individually() {
        let payload = json!({
            "balldontlie": { "id": "not-a-number" },
            "nba_api": { "id": "265" }
        });
        assert_eq!(
            extract_external_ids(&payload).unwrap(),
            vec![ExternalId::new(Provider::NbaApi, 265)]
        );
    }

    #[test]
    fn entry_without_id_is_skipped() {
        let payload = json!({ "nba_api": { "code": "LAL" } });
        assert!(extract_external_ids(&payload).unwrap().is_empty());
    }

    #[test]
    fn non_object_payload_is_an_error() {
        assert_eq!(extract_external_ids(&Value::Null), Err(IdentityError::Missing));
        assert_eq!(
            extract_external_ids(&json!("{broken")),
            Err(IdentityError::Malformed { found: "string" })
        );
        assert_eq!(external_id_for(&json!([1, 2]), Provider::NbaApi), None);
    }

    #[test]
    fn payload_for_round_trips_through_extraction() {
        let payload = payload_for(Provider::BallDontLie, 237);
        assert_eq!(payload, json!({ "balldontlie": { "id": 237 } }));
        assert_eq!(external_id_for(&payload, Provider::BallDontLie), Some(237));
    }
}
