use std::collections::HashSet;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::player::{self, Entity as Player};
use crate::entity::player_team_history::{self, Entity as PlayerTeamHistory};

use super::CHUNK_SIZE;
use super::errors::Result;

/// Players recorded on a team for a season.
///
/// Combines players whose latest observation places them on the team for
/// that season with players holding a history row for it. Each player
/// appears once; results are ordered by last name, then first name.
pub async fn players_on_roster<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
    season: i32,
) -> Result<Vec<player::Model>> {
    let mut players = Player::find()
        .filter(player::Column::CurrentTeamId.eq(team_id))
        .filter(player::Column::Season.eq(season))
        .all(db)
        .await?;

    let mut seen: HashSet<Uuid> = players.iter().map(|p| p.id).collect();
    let past: Vec<Uuid> = PlayerTeamHistory::find()
        .filter(player_team_history::Column::TeamId.eq(team_id))
        .filter(player_team_history::Column::Season.eq(season))
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.player_id)
        .filter(|id| seen.insert(*id))
        .collect();

    for chunk in past.chunks(CHUNK_SIZE) {
        players.extend(
            Player::find()
                .filter(player::Column::Id.is_in(chunk.iter().copied()))
                .all(db)
                .await?,
        );
    }

    players.sort_by(|a, b| {
        a.last_name
            .to_lowercase()
            .cmp(&b.last_name.to_lowercase())
            .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
    });
    Ok(players)
}
