//! The fixed NBA franchise list and the spellings providers use for it.
//!
//! Anything that doesn't resolve to one of these thirty franchises (all-star
//! squads, G League affiliates, defunct teams) is dropped before team rows are
//! compared with the store.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::provider::TeamRecord;

/// One real-world franchise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Franchise {
    pub full_name: &'static str,
    pub city: &'static str,
    pub name: &'static str,
    pub abbreviation: &'static str,
    /// Extra spellings seen in provider feeds.
    pub aliases: &'static [&'static str],
}

macro_rules! franchise {
    ($abbr:literal, $city:literal, $name:literal $(, $alias:literal)* $(,)?) => {
        Franchise {
            full_name: concat!($city, " ", $name),
            city: $city,
            name: $name,
            abbreviation: $abbr,
            aliases: &[$($alias),*],
        }
    };
}

pub static FRANCHISES: &[Franchise] = &[
    franchise!("ATL", "Atlanta", "Hawks"),
    franchise!("BOS", "Boston", "Celtics"),
    franchise!("BKN", "Brooklyn", "Nets", "BRK"),
    franchise!("CHA", "Charlotte", "Hornets", "CHO"),
    franchise!("CHI", "Chicago", "Bulls"),
    franchise!("CLE", "Cleveland", "Cavaliers", "Cavs", "Cleveland Cavs"),
    franchise!("DAL", "Dallas", "Mavericks", "Mavs", "Dallas Mavs"),
    franchise!("DEN", "Denver", "Nuggets"),
    franchise!("DET", "Detroit", "Pistons"),
    franchise!("GSW", "Golden State", "Warriors", "GS", "GS Warriors"),
    franchise!("HOU", "Houston", "Rockets"),
    franchise!("IND", "Indiana", "Pacers"),
    franchise!("LAC", "Los Angeles", "Clippers", "LA Clippers"),
    franchise!("LAL", "Los Angeles", "Lakers", "LA Lakers"),
    franchise!("MEM", "Memphis", "Grizzlies"),
    franchise!("MIA", "Miami", "Heat"),
    franchise!("MIL", "Milwaukee", "Bucks"),
    franchise!("MIN", "Minnesota", "Timberwolves", "Wolves"),
    franchise!("NOP", "New Orleans", "Pelicans", "NO", "NO Pelicans", "NOLA Pelicans"),
    franchise!("NYK", "New York", "Knicks", "NY", "NY Knicks"),
    franchise!("OKC", "Oklahoma City", "Thunder", "OKC Thunder"),
    franchise!("ORL", "Orlando", "Magic"),
    franchise!("PHI", "Philadelphia", "76ers", "Sixers", "Philly 76ers", "Philly Sixers"),
    franchise!("PHX", "Phoenix", "Suns", "PHO"),
    franchise!("POR", "Portland", "Trail Blazers", "Blazers", "Portland Trailblazers"),
    franchise!("SAC", "Sacramento", "Kings"),
    franchise!("SAS", "San Antonio", "Spurs", "SA", "SA Spurs"),
    franchise!("TOR", "Toronto", "Raptors"),
    franchise!("UTA", "Utah", "Jazz", "UTAH"),
    franchise!("WAS", "Washington", "Wizards", "WSH"),
];

/// City shorthand seen in provider feeds.
static CITY_ABBREVIATIONS: &[(&str, &str)] = &[
    ("LA", "Los Angeles"),
    ("L.A.", "Los Angeles"),
    ("NY", "New York"),
    ("SF", "San Francisco"),
    ("Philly", "Philadelphia"),
];

fn key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Every known spelling, lowercased, mapped to its franchise.
static BY_SPELLING: LazyLock<HashMap<String, &'static Franchise>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for franchise in FRANCHISES {
        let spellings = [
            franchise.full_name.to_string(),
            franchise.abbreviation.to_string(),
            franchise.name.to_string(),
            format!("{} {}", franchise.abbreviation, franchise.name),
        ];
        for spelling in spellings
            .into_iter()
            .chain(franchise.aliases.iter().map(|a| a.to_string()))
        {
            map.insert(key(&spelling), franchise);
        }
    }
    map
});

/// Expand a city abbreviation ("LA" -> "Los Angeles"), ignoring case.
pub fn expand_city(token: &str) -> Option<&'static str> {
    CITY_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(token))
        .map(|(_, city)| *city)
}

/// Rewrite a city, expanding shorthand. Unknown cities pass through trimmed.
pub fn normalize_city(city: &str) -> String {
    let trimmed = city.trim();
    expand_city(trimmed)
        .map(str::to_string)
        .unwrap_or_else(|| trimmed.to_string())
}

/// Resolve any known spelling to its franchise, ignoring case.
pub fn lookup(name: &str) -> Option<&'static Franchise> {
    BY_SPELLING.get(&key(name)).copied()
}

/// Canonical full name for a spelling, e.g. "GSW" -> "Golden State Warriors".
pub fn canonical_full_name(name: &str) -> Option<&'static str> {
    lookup(name).map(|f| f.full_name)
}

/// Find the franchise a raw team record refers to.
///
/// Tries the full name, then "city name" with shorthand expanded, then the
/// abbreviation.
fn resolve(team: &TeamRecord) -> Option<&'static Franchise> {
    lookup(&team.full_name)
        .or_else(|| {
            let city = team.city.as_deref().map(normalize_city).unwrap_or_default();
            lookup(&format!("{} {}", city, team.name))
        })
        .or_else(|| lookup(&team.abbreviation))
}

/// Rewrite a team onto its franchise, or `None` if it isn't one.
///
/// Full name, city and abbreviation are replaced with canonical values; the
/// short name is filled only when missing.
pub fn canonicalize(mut team: TeamRecord) -> Option<TeamRecord> {
    let franchise = resolve(&team)?;

    team.full_name = franchise.full_name.to_string();
    team.abbreviation = franchise.abbreviation.to_string();
    team.city = Some(match team.city.as_deref().map(normalize_city) {
        Some(city) if !city.is_empty() => city,
        _ => franchise.city.to_string(),
    });
    if team.name.trim().is_empty() {
        team.name = franchise.name.to_string();
    }
    Some(team)
}

/// Canonicalize every team and drop the ones that aren't franchises.
pub fn canonicalize_all(teams: Vec<TeamRecord>) -> Vec<TeamRecord> {
    teams
        .into_iter()
        .filter_map(|team| {
            let label = team.full_name.clone();
            let canonical = canonicalize(team);
            if canonical.is_none() {
                tracing::debug!(team = %label, "Dropping non-franchise team");
            }
            canonical
        })
        .collect()
}
