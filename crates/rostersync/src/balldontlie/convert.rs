use crate::entity::provider::Provider;
use crate::identity::payload_for;
use crate::provider::{PlayerRecord, ProviderError, TeamRecord, non_blank};

use super::types::{BdlPlayer, BdlTeam};

/// Map a `/players` entry to a player observation for `season`.
///
/// balldontlie only lists current players and reports no season, so the
/// caller supplies the season being synced.
pub fn to_player_record(player: BdlPlayer, season: i32) -> Result<PlayerRecord, ProviderError> {
    let first_name = non_blank(player.first_name).unwrap_or_default();
    let last_name = non_blank(player.last_name).unwrap_or_default();
    if first_name.is_empty() && last_name.is_empty() {
        return Err(ProviderError::parse(format!("player {} has no name", player.id)));
    }

    let weight = match player.weight {
        Some(w) => w.to_i32("weight")?,
        None => None,
    };

    Ok(PlayerRecord {
        provider: Provider::BallDontLie,
        first_name,
        last_name,
        position: non_blank(player.position),
        height: non_blank(player.height),
        weight,
        jersey_number: non_blank(player.jersey_number),
        college: non_blank(player.college),
        country: non_blank(player.country),
        draft_year: player.draft_year,
        draft_round: player.draft_round,
        draft_number: player.draft_number,
        is_active: true,
        start_year: None,
        season,
        team_external_id: player.team.map(|t| t.id),
        external_ids: payload_for(Provider::BallDontLie, player.id),
    })
}

pub fn to_team_record(team: BdlTeam) -> Result<TeamRecord, ProviderError> {
    let full_name = non_blank(team.full_name)
        .ok_or_else(|| ProviderError::parse(format!("team {} has no full_name", team.id)))?;

    Ok(TeamRecord {
        city: non_blank(team.city),
        name: non_blank(team.name).unwrap_or_default(),
        full_name,
        abbreviation: non_blank(team.abbreviation).unwrap_or_default(),
        conference: non_blank(team.conference),
        division: non_blank(team.division),
        logo_url: None,
        nickname: None,
        external_ids: payload_for(Provider::BallDontLie, team.id),
    })
}
