//! Provider enum: the external data sources rosters are pulled from.
//!
//! Each provider owns its own identifier space. External ids are only
//! meaningful together with the provider that issued them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supported roster providers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// balldontlie.io
    #[sea_orm(string_value = "balldontlie")]
    #[serde(rename = "balldontlie")]
    BallDontLie,
    /// api-sports NBA v2, served through RapidAPI.
    #[sea_orm(string_value = "nba_api")]
    NbaApi,
}

impl Provider {
    /// Stable key used in stored external-id payloads and config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::BallDontLie => "balldontlie",
            Provider::NbaApi => "nba_api",
        }
    }

    /// Parse a provider name, returning `None` for keys we don't know.
    ///
    /// Matching ignores case, underscores and dashes, so `NBA_API`,
    /// `NbaApi` and `nba-api` all resolve.
    pub fn from_key(key: &str) -> Option<Self> {
        let folded: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "balldontlie" => Some(Provider::BallDontLie),
            "nbaapi" => Some(Provider::NbaApi),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::from_key(s).ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_stored_key() {
        assert_eq!(Provider::BallDontLie.to_string(), "balldontlie");
        assert_eq!(Provider::NbaApi.to_string(), "nba_api");
    }

    #[test]
    fn test_from_str_accepts_aliases() {
        for alias in ["balldontlie", "BallDontLie", "ball_dont_lie", "BALLDONTLIE"] {
            assert_eq!(alias.parse::<Provider>(), Ok(Provider::BallDontLie));
        }
        for alias in ["nba_api", "NbaApi", "NBA_API", "nba-api", "nbaapi"] {
            assert_eq!(alias.parse::<Provider>(), Ok(Provider::NbaApi));
        }
    }

    #[test]
    fn test_unknown_provider() {
        assert!("sportradar".parse::<Provider>().is_err());
        assert_eq!(Provider::from_key(""), None);
    }
}
