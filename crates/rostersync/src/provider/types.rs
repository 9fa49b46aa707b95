use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::entity::provider::Provider;
use crate::sync::ProgressCallback;
use crate::sync::lookup::TeamLookup;

use super::errors::{ProviderError, Result};

/// An integer some providers send as a JSON number and others as a string.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum LooseInt {
    Number(i64),
    Text(String),
}

impl LooseInt {
    /// `Ok(None)` for blank text; an error for text that isn't a number.
    pub fn to_i32(&self, field: &str) -> Result<Option<i32>> {
        let value = match self {
            LooseInt::Number(n) => *n,
            LooseInt::Text(s) if s.trim().is_empty() => return Ok(None),
            LooseInt::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                ProviderError::parse(format!("{field}: {s:?} is not a number"))
            })?,
        };
        i32::try_from(value)
            .map(Some)
            .map_err(|_| ProviderError::parse(format!("{field}: {value} out of range")))
    }
}

/// Trim a string, turning blank into `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A team as one provider reports it, before merging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamRecord {
    pub city: Option<String>,
    pub name: String,
    pub full_name: String,
    pub abbreviation: String,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub logo_url: Option<String>,
    pub nickname: Option<String>,
    /// Provider name -> `{ "id": .. }`.
    pub external_ids: serde_json::Value,
}

/// One seasonal observation of a player from one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub provider: Provider,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub height: Option<String>,
    pub weight: Option<i32>,
    pub jersey_number: Option<String>,
    pub college: Option<String>,
    pub country: Option<String>,
    pub draft_year: Option<i32>,
    pub draft_round: Option<i32>,
    pub draft_number: Option<i32>,
    pub is_active: bool,
    pub start_year: Option<i32>,
    pub season: i32,
    /// The provider's id for the team this row places the player on.
    pub team_external_id: Option<i64>,
    /// Provider name -> `{ "id": .. }`.
    pub external_ids: serde_json::Value,
}

/// Records parsed from a provider, plus what went wrong along the way.
///
/// Neither kind of failure aborts a sync: malformed records are skipped and a
/// failed fetch keeps whatever pages arrived before it.
#[derive(Debug)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    /// Records dropped because they failed to parse.
    pub skipped: usize,
    /// Fetch failures, one line each.
    pub errors: Vec<String>,
}

impl<T> Default for Fetched<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
            errors: Vec::new(),
        }
    }
}

impl<T> Fetched<T> {
    pub fn skip(&mut self, provider: Provider, reason: impl std::fmt::Display) {
        self.skipped += 1;
        tracing::warn!(provider = %provider, %reason, "Skipping malformed record");
    }

    pub fn fail(&mut self, provider: Provider, error: impl std::fmt::Display) {
        tracing::error!(provider = %provider, %error, "Provider fetch failed");
        self.errors.push(format!("{provider}: {error}"));
    }

    /// Parse every element of `page[key]`, one record at a time.
    ///
    /// Elements that don't deserialize as `D`, or that `convert` rejects, are
    /// skipped. A page without the array is recorded as a fetch failure.
    pub fn extend_from_page<D, F>(&mut self, provider: Provider, page: &Value, key: &str, mut convert: F)
    where
        D: DeserializeOwned,
        F: FnMut(D) -> Result<T>,
    {
        let Some(items) = page.get(key).and_then(Value::as_array) else {
            self.fail(provider, format!("response has no `{key}` array"));
            return;
        };

        for item in items {
            let record = serde_json::from_value::<D>(item.clone())
                .map_err(ProviderError::from)
                .and_then(&mut convert);
            match record {
                Ok(record) => self.items.push(record),
                Err(e) => self.skip(provider, e),
            }
        }
    }
}

/// A roster provider.
///
/// Implementations do their own paging and parsing and hand back canonical
/// records. Transport failures that leave nothing to work with are returned as
/// `Err`; partial failures are reported inside [`Fetched`].
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// The provider whose id space this client's records use.
    fn provider(&self) -> Provider;

    async fn fetch_teams(&self, on_progress: Option<&ProgressCallback>)
    -> Result<Fetched<TeamRecord>>;

    /// Fetch player rows. `teams` resolves persisted teams to this provider's
    /// ids, for providers that page players per team.
    async fn fetch_players(
        &self,
        teams: &TeamLookup,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Fetched<PlayerRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_int_accepts_numbers_and_digit_strings() {
        assert_eq!(LooseInt::Number(190).to_i32("weight").unwrap(), Some(190));
        assert_eq!(LooseInt::Text(" 215 ".into()).to_i32("weight").unwrap(), Some(215));
        assert_eq!(LooseInt::Text("".into()).to_i32("weight").unwrap(), None);
    }

    #[test]
    fn loose_int_rejects_garbage() {
        let err = LooseInt::Text("heavy".into()).to_i32("weight").unwrap_err();
        assert!(err.to_string().contains("weight"));
        assert!(LooseInt::Number(i64::MAX).to_i32("weight").is_err());
    }

    #[derive(Debug, serde::Deserialize)]
    struct Row {
        id: i64,
    }

    #[test]
    fn extend_from_page_skips_bad_rows() {
        let page = serde_json::json!({ "data": [{ "id": 1 }, { "id": "x" }, { "id": -4 }] });
        let mut fetched: Fetched<i64> = Fetched::default();
        fetched.extend_from_page(Provider::BallDontLie, &page, "data", |row: Row| {
            if row.id < 0 {
                Err(ProviderError::parse("negative id"))
            } else {
                Ok(row.id)
            }
        });

        assert_eq!(fetched.items, vec![1]);
        assert_eq!(fetched.skipped, 2);
        assert!(fetched.errors.is_empty());
    }

    #[test]
    fn extend_from_page_without_array_is_a_failure() {
        let mut fetched: Fetched<i64> = Fetched::default();
        fetched.extend_from_page(Provider::NbaApi, &serde_json::json!({ "errors": {} }), "response", |row: Row| Ok(row.id));
        assert!(fetched.items.is_empty());
        assert_eq!(fetched.errors.len(), 1);
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  Duke ".into())), Some("Duke".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
