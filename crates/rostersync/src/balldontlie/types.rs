use serde::Deserialize;

use crate::provider::LooseInt;

/// `/teams` and the nested `team` on each player.
#[derive(Debug, Clone, Deserialize)]
pub struct BdlTeam {
    pub id: i64,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub abbreviation: Option<String>,
}

/// One entry of `/players`.
#[derive(Debug, Clone, Deserialize)]
pub struct BdlPlayer {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    /// Feet-inches, e.g. "6-6".
    pub height: Option<String>,
    pub weight: Option<LooseInt>,
    pub jersey_number: Option<String>,
    pub college: Option<String>,
    pub country: Option<String>,
    pub draft_year: Option<i32>,
    pub draft_round: Option<i32>,
    pub draft_number: Option<i32>,
    pub team: Option<BdlTeam>,
}

/// Pagination block of a `/players` page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BdlMeta {
    pub next_cursor: Option<LooseInt>,
    pub per_page: Option<u32>,
}
