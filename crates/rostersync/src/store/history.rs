use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::player_team_history::{ActiveModel, Column, Entity as PlayerTeamHistory, Model};

use super::errors::Result;

/// A past `(player, team, season)` assignment waiting to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HistoryEntry {
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub season: i32,
}

/// Record a history row unless the same `(player, team, season)` exists.
///
/// Returns `true` when a row was inserted.
pub async fn add_team_history_if_absent<C: ConnectionTrait>(
    db: &C,
    player_id: Uuid,
    team_id: Uuid,
    season: i32,
) -> Result<bool> {
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        player_id: Set(player_id),
        team_id: Set(team_id),
        season: Set(season),
        acquired_at: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
    };

    let inserted = PlayerTeamHistory::insert(model)
        .on_conflict(
            OnConflict::columns([Column::PlayerId, Column::TeamId, Column::Season])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(inserted > 0)
}

/// A player's recorded history, oldest season first.
pub async fn history_for_player<C: ConnectionTrait>(db: &C, player_id: Uuid) -> Result<Vec<Model>> {
    Ok(PlayerTeamHistory::find()
        .filter(Column::PlayerId.eq(player_id))
        .order_by_asc(Column::Season)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            rows_affected,
            last_insert_id: 0,
        }
    }

    #[tokio::test]
    async fn reports_whether_a_row_was_added() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();

        let (player, team) = (Uuid::new_v4(), Uuid::new_v4());
        assert!(add_team_history_if_absent(&db, player, team, 2021).await.unwrap());
        assert!(!add_team_history_if_absent(&db, player, team, 2021).await.unwrap());

        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("ON CONFLICT"));
        assert!(sql.contains("DO NOTHING"));
    }
}
