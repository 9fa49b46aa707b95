//! Response shapes. Every list endpoint wraps its items in `response`.

use serde::Deserialize;

use crate::provider::LooseInt;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaConferenceInfo {
    pub conference: Option<String>,
    pub division: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaTeamLeagues {
    pub standard: Option<NbaConferenceInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NbaTeam {
    pub id: i64,
    /// Full name, e.g. "Los Angeles Lakers".
    pub name: Option<String>,
    pub nickname: Option<String>,
    /// Tricode.
    pub code: Option<String>,
    pub city: Option<String>,
    pub logo: Option<String>,
    pub all_star: Option<bool>,
    pub nba_franchise: Option<bool>,
    pub leagues: Option<NbaTeamLeagues>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaBirth {
    pub date: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaCareer {
    pub start: Option<LooseInt>,
    pub pro: Option<LooseInt>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaHeight {
    pub feets: Option<LooseInt>,
    pub inches: Option<LooseInt>,
    pub meters: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaWeight {
    pub pounds: Option<LooseInt>,
    pub kilograms: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaStandardLeague {
    pub jersey: Option<LooseInt>,
    pub active: Option<bool>,
    pub pos: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NbaPlayerLeagues {
    pub standard: Option<NbaStandardLeague>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NbaPlayer {
    pub id: i64,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub birth: Option<NbaBirth>,
    pub nba: Option<NbaCareer>,
    pub height: Option<NbaHeight>,
    pub weight: Option<NbaWeight>,
    pub college: Option<String>,
    pub affiliation: Option<String>,
    pub leagues: Option<NbaPlayerLeagues>,
}
