use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::entity::external_identity::EntityKind;
use crate::entity::team::{ActiveModel, Column, Entity as Team, Model};

use super::CHUNK_SIZE;
use super::errors::{Result, StoreError};
use super::identities::{delete_identities, identity_rows, insert_identities};

/// Every persisted team, by full name.
pub async fn get_teams<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>> {
    Team::find()
        .order_by_asc(Column::FullName)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Find a team by tricode, ignoring case.
pub async fn find_team_by_abbreviation<C: ConnectionTrait>(
    db: &C,
    abbreviation: &str,
) -> Result<Option<Model>> {
    Team::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(Column::Abbreviation)))
                .eq(abbreviation.trim().to_lowercase()),
        )
        .one(db)
        .await
        .map_err(StoreError::from)
}

fn insert_model(team: &Model) -> ActiveModel {
    ActiveModel {
        id: Set(team.id),
        created_at: Set(team.created_at),
        ..update_model(team)
    }
}

/// Every column except the primary key and `created_at`.
fn update_model(team: &Model) -> ActiveModel {
    ActiveModel {
        city: Set(team.city.clone()),
        name: Set(team.name.clone()),
        full_name: Set(team.full_name.clone()),
        abbreviation: Set(team.abbreviation.clone()),
        conference: Set(team.conference.clone()),
        division: Set(team.division.clone()),
        logo_url: Set(team.logo_url.clone()),
        nickname: Set(team.nickname.clone()),
        external_ids: Set(team.external_ids.clone()),
        updated_at: Set(team.updated_at),
        ..Default::default()
    }
}

async fn write_teams<C: ConnectionTrait>(db: &C, new: &[Model], updated: &[Model]) -> Result<usize> {
    for chunk in new.chunks(CHUNK_SIZE) {
        let models: Vec<ActiveModel> = chunk.iter().map(insert_model).collect();
        Team::insert_many(models).exec_without_returning(db).await?;
    }

    for team in updated {
        Team::update_many()
            .set(update_model(team))
            .filter(Column::Id.eq(team.id))
            .exec(db)
            .await?;
    }

    let updated_ids: Vec<Uuid> = updated.iter().map(|t| t.id).collect();
    delete_identities(db, EntityKind::Team, &updated_ids).await?;

    let rows = new
        .iter()
        .chain(updated)
        .flat_map(|team| identity_rows(EntityKind::Team, team.id, &team.external_ids))
        .collect();
    insert_identities(db, rows).await?;

    Ok(new.len() + updated.len())
}

/// Insert new teams and rewrite changed ones, identities included, in one
/// transaction.
///
/// Returns the number of team rows written.
pub async fn save_new_and_updated_teams(
    db: &DatabaseConnection,
    new: &[Model],
    updated: &[Model],
) -> Result<usize> {
    if new.is_empty() && updated.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;
    let written = write_teams(&txn, new, updated).await?;
    txn.commit().await?;

    tracing::debug!(new = new.len(), updated = updated.len(), "Saved teams");
    Ok(written)
}
