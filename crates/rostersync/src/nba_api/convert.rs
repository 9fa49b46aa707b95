use crate::entity::provider::Provider;
use crate::identity::payload_for;
use crate::provider::{LooseInt, PlayerRecord, ProviderError, TeamRecord, non_blank};

use super::types::{NbaHeight, NbaPlayer, NbaTeam};

fn loose(value: Option<&LooseInt>, field: &str) -> Result<Option<i32>, ProviderError> {
    match value {
        Some(v) => v.to_i32(field),
        None => Ok(None),
    }
}

/// "6-6" from separate feet and inches. Feet alone gives "6-0".
fn format_height(height: Option<&NbaHeight>) -> Result<Option<String>, ProviderError> {
    let Some(height) = height else {
        return Ok(None);
    };
    let feet = loose(height.feets.as_ref(), "height.feets")?;
    let inches = loose(height.inches.as_ref(), "height.inches")?;
    Ok(feet.map(|f| format!("{}-{}", f, inches.unwrap_or(0))))
}

/// Map one roster entry fetched for `(team_id, season)`.
///
/// The roster endpoint doesn't repeat the team on each player, so the team
/// and season come from the request that produced the page.
pub fn to_player_record(
    player: NbaPlayer,
    team_id: i64,
    season: i32,
) -> Result<PlayerRecord, ProviderError> {
    let first_name = non_blank(player.firstname).unwrap_or_default();
    let last_name = non_blank(player.lastname).unwrap_or_default();
    if first_name.is_empty() && last_name.is_empty() {
        return Err(ProviderError::parse(format!("player {} has no name", player.id)));
    }

    let standard = player.leagues.and_then(|l| l.standard).unwrap_or_default();
    let jersey = loose(standard.jersey.as_ref(), "leagues.standard.jersey")?;
    let start_year = loose(player.nba.as_ref().and_then(|n| n.start.as_ref()), "nba.start")?;
    let weight = loose(
        player.weight.as_ref().and_then(|w| w.pounds.as_ref()),
        "weight.pounds",
    )?;

    Ok(PlayerRecord {
        provider: Provider::NbaApi,
        first_name,
        last_name,
        position: non_blank(standard.pos),
        height: format_height(player.height.as_ref())?,
        weight,
        jersey_number: jersey.map(|j| j.to_string()),
        college: non_blank(player.college),
        country: non_blank(player.birth.and_then(|b| b.country)),
        draft_year: None,
        draft_round: None,
        draft_number: None,
        is_active: standard.active.unwrap_or(true),
        start_year,
        season,
        team_external_id: Some(team_id),
        external_ids: payload_for(Provider::NbaApi, player.id),
    })
}

pub fn to_team_record(team: NbaTeam) -> Result<TeamRecord, ProviderError> {
    let full_name = non_blank(team.name)
        .ok_or_else(|| ProviderError::parse(format!("team {} has no name", team.id)))?;
    let standard = team.leagues.and_then(|l| l.standard).unwrap_or_default();
    let nickname = non_blank(team.nickname);

    Ok(TeamRecord {
        city: non_blank(team.city),
        name: nickname.clone().unwrap_or_default(),
        full_name,
        abbreviation: non_blank(team.code).unwrap_or_default(),
        conference: non_blank(standard.conference),
        division: non_blank(standard.division),
        logo_url: non_blank(team.logo),
        nickname,
        external_ids: payload_for(Provider::NbaApi, team.id),
    })
}
