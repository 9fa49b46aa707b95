//! Keeping the `external_identities` table in step with id payloads.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::external_identity::{ActiveModel, Column, Entity as ExternalIdentity, EntityKind};
use crate::entity::provider::Provider;
use crate::identity::extract_external_ids;

use super::errors::Result;
use super::CHUNK_SIZE;

/// One identity row per readable id in `payload`.
pub(crate) fn identity_rows(kind: EntityKind, entity_id: Uuid, payload: &Value) -> Vec<ActiveModel> {
    match extract_external_ids(payload) {
        Ok(ids) => ids
            .into_iter()
            .map(|ext| ActiveModel {
                id: Set(Uuid::new_v4()),
                entity_kind: Set(kind),
                entity_id: Set(entity_id),
                provider: Set(ext.provider),
                external_id: Set(ext.id),
            })
            .collect(),
        Err(e) => {
            tracing::warn!(entity = %entity_id, error = %e, "Not indexing unreadable external ids");
            Vec::new()
        }
    }
}

/// Insert identity rows, leaving any `(kind, provider, id)` that is already
/// claimed untouched.
pub(crate) async fn insert_identities<C: ConnectionTrait>(db: &C, rows: Vec<ActiveModel>) -> Result<u64> {
    let mut inserted = 0;
    for chunk in rows.chunks(CHUNK_SIZE) {
        inserted += ExternalIdentity::insert_many(chunk.to_vec())
            .on_conflict(
                OnConflict::columns([Column::EntityKind, Column::Provider, Column::ExternalId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }
    Ok(inserted)
}

/// Drop every identity row owned by these entities.
pub(crate) async fn delete_identities<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    entity_ids: &[Uuid],
) -> Result<u64> {
    let mut deleted = 0;
    for chunk in entity_ids.chunks(CHUNK_SIZE) {
        deleted += ExternalIdentity::delete_many()
            .filter(Column::EntityKind.eq(kind))
            .filter(Column::EntityId.is_in(chunk.iter().copied()))
            .exec(db)
            .await?
            .rows_affected;
    }
    Ok(deleted)
}

/// Entity ids that claim any of `external_ids` for `provider`.
pub(crate) async fn entity_ids_for<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    provider: Provider,
    external_ids: &[i64],
) -> Result<Vec<Uuid>> {
    let mut found = Vec::new();
    for chunk in external_ids.chunks(CHUNK_SIZE) {
        let rows = ExternalIdentity::find()
            .filter(Column::EntityKind.eq(kind))
            .filter(Column::Provider.eq(provider))
            .filter(Column::ExternalId.is_in(chunk.iter().copied()))
            .all(db)
            .await?;
        found.extend(rows.into_iter().map(|row| row.entity_id));
    }
    found.sort_unstable();
    found.dedup();
    Ok(found)
}
