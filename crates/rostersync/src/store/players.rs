use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::external_identity::EntityKind;
use crate::entity::player::{ActiveModel, Column, Entity as Player, Model};
use crate::entity::provider::Provider;

use super::CHUNK_SIZE;
use super::errors::Result;
use super::identities::{delete_identities, entity_ids_for, identity_rows, insert_identities};

/// Persisted players owned by `provider` that claim any of `external_ids`.
///
/// Matching goes through the identity table, so a player is found no matter
/// how its id payload keys are spelled.
pub async fn get_players_by_external_ids<C: ConnectionTrait>(
    db: &C,
    external_ids: &[i64],
    provider: Provider,
) -> Result<Vec<Model>> {
    if external_ids.is_empty() {
        return Ok(Vec::new());
    }

    let ids = entity_ids_for(db, EntityKind::Player, provider, external_ids).await?;
    let mut players = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(CHUNK_SIZE) {
        players.extend(
            Player::find()
                .filter(Column::Id.is_in(chunk.iter().copied()))
                .filter(Column::Provider.eq(provider))
                .all(db)
                .await?,
        );
    }
    Ok(players)
}

fn insert_model(player: &Model) -> ActiveModel {
    ActiveModel {
        id: Set(player.id),
        provider: Set(player.provider),
        created_at: Set(player.created_at),
        ..update_model(player)
    }
}

/// Every column except the primary key, owner and `created_at`.
fn update_model(player: &Model) -> ActiveModel {
    ActiveModel {
        first_name: Set(player.first_name.clone()),
        last_name: Set(player.last_name.clone()),
        position: Set(player.position.clone()),
        height: Set(player.height.clone()),
        weight: Set(player.weight),
        jersey_number: Set(player.jersey_number.clone()),
        college: Set(player.college.clone()),
        country: Set(player.country.clone()),
        draft_year: Set(player.draft_year),
        draft_round: Set(player.draft_round),
        draft_number: Set(player.draft_number),
        is_active: Set(player.is_active),
        start_year: Set(player.start_year),
        season: Set(player.season),
        current_team_id: Set(player.current_team_id),
        external_ids: Set(player.external_ids.clone()),
        updated_at: Set(player.updated_at),
        ..Default::default()
    }
}

/// Insert new players and rewrite updated ones, keeping their identity rows
/// in step. Runs on whatever connection it's given; wrap it in a transaction
/// to make it atomic.
///
/// Returns the number of player rows written.
pub async fn save_new_and_updated_players<C: ConnectionTrait>(
    db: &C,
    new: &[Model],
    updated: &[Model],
) -> Result<usize> {
    for chunk in new.chunks(CHUNK_SIZE) {
        let models: Vec<ActiveModel> = chunk.iter().map(insert_model).collect();
        Player::insert_many(models).exec_without_returning(db).await?;
    }

    for player in updated {
        Player::update_many()
            .set(update_model(player))
            .filter(Column::Id.eq(player.id))
            .exec(db)
            .await?;
    }

    let updated_ids: Vec<Uuid> = updated.iter().map(|p| p.id).collect();
    delete_identities(db, EntityKind::Player, &updated_ids).await?;

    let rows = new
        .iter()
        .chain(updated)
        .flat_map(|player| identity_rows(EntityKind::Player, player.id, &player.external_ids))
        .collect();
    insert_identities(db, rows).await?;

    Ok(new.len() + updated.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    use crate::entity::external_identity;

    fn player(external_id: i64) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: Uuid::new_v4(),
            provider: Provider::NbaApi,
            first_name: "Jayson".to_string(),
            last_name: "Tatum".to_string(),
            position: Some("F".to_string()),
            height: Some("6-8".to_string()),
            weight: Some(210),
            jersey_number: Some("0".to_string()),
            college: Some("Duke".to_string()),
            country: Some("USA".to_string()),
            draft_year: None,
            draft_round: None,
            draft_number: None,
            is_active: true,
            start_year: Some(2017),
            season: 2024,
            current_team_id: None,
            external_ids: json!({ "nba_api": { "id": external_id } }),
            created_at: now,
            updated_at: now,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            rows_affected,
            last_insert_id: 0,
        }
    }

    #[tokio::test]
    async fn lookup_with_no_ids_skips_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let players = get_players_by_external_ids(&db, &[], Provider::NbaApi)
            .await
            .unwrap();
        assert!(players.is_empty());
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn lookup_goes_through_identity_table() {
        let stored = player(882);
        let identity = external_identity::Model {
            id: Uuid::new_v4(),
            entity_kind: EntityKind::Player,
            entity_id: stored.id,
            provider: Provider::NbaApi,
            external_id: 882,
        };
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![identity]])
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let players = get_players_by_external_ids(&db, &[882, 883], Provider::NbaApi)
            .await
            .unwrap();
        assert_eq!(players, vec![stored]);
    }

    #[tokio::test]
    async fn save_players_writes_identities_for_new_rows() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            // insert players, insert identities
            .append_exec_results([exec(2), exec(2)])
            .into_connection();

        let written = save_new_and_updated_players(&db, &[player(1), player(2)], &[])
            .await
            .expect("save should succeed");
        assert_eq!(written, 2);
    }

    #[tokio::test]
    async fn save_players_replaces_identities_of_updated_rows() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            // update, delete identities, insert identities
            .append_exec_results([exec(1), exec(1), exec(1)])
            .into_connection();

        let written = save_new_and_updated_players(&db, &[], &[player(7)])
            .await
            .expect("save should succeed");
        assert_eq!(written, 1);

        let sql = format!("{:?}", db.into_transaction_log());
        assert!(sql.contains("UPDATE"));
        assert!(sql.contains("DELETE"));
    }
}
