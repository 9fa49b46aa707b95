//! Persistence for teams, players, history and diagnostics.
//!
//! Each operation is a free function over any sea-orm connection, so it runs
//! the same on a pool or inside a transaction. [`Store`] bundles the ones the
//! sync engine needs behind a trait; [`SeaOrmStore`] implements it.

mod diagnostics;
mod errors;
mod history;
mod identities;
mod players;
mod roster;
mod teams;

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::entity::provider::Provider;
use crate::entity::{player, team};

pub use diagnostics::{
    CATEGORY_IDENTITY, CATEGORY_TEAM_RESOLUTION, add_diagnostic_log_entry, diagnostics_by_category,
};
pub use errors::{Result, StoreError};
pub use history::{HistoryEntry, add_team_history_if_absent, history_for_player};
pub use players::{get_players_by_external_ids, save_new_and_updated_players};
pub use roster::players_on_roster;
pub use teams::{find_team_by_abbreviation, get_teams, save_new_and_updated_teams};

/// Rows per multi-row statement, well under sqlite's bind-variable limit.
pub(crate) const CHUNK_SIZE: usize = 200;

/// What one provider's player write committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerSyncWrite {
    pub players: usize,
    pub history_added: usize,
}

/// Write one provider's players and their history in a single transaction.
///
/// Either everything lands or nothing does.
pub async fn persist_player_sync(
    db: &DatabaseConnection,
    new: &[player::Model],
    updated: &[player::Model],
    history: &[HistoryEntry],
) -> Result<PlayerSyncWrite> {
    if new.is_empty() && updated.is_empty() && history.is_empty() {
        return Ok(PlayerSyncWrite::default());
    }

    let txn = db.begin().await?;
    let players = save_new_and_updated_players(&txn, new, updated).await?;
    let mut history_added = 0;
    for entry in history {
        if add_team_history_if_absent(&txn, entry.player_id, entry.team_id, entry.season).await? {
            history_added += 1;
        }
    }
    txn.commit().await?;

    Ok(PlayerSyncWrite {
        players,
        history_added,
    })
}

/// The storage operations the sync engine depends on.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_teams(&self) -> Result<Vec<team::Model>>;

    async fn save_new_and_updated_teams(
        &self,
        new: &[team::Model],
        updated: &[team::Model],
    ) -> Result<usize>;

    async fn get_players_by_external_ids(
        &self,
        external_ids: &[i64],
        provider: Provider,
    ) -> Result<Vec<player::Model>>;

    async fn save_new_and_updated_players(
        &self,
        new: &[player::Model],
        updated: &[player::Model],
    ) -> Result<usize>;

    async fn add_team_history_if_absent(&self, player_id: Uuid, team_id: Uuid, season: i32) -> Result<bool>;

    async fn add_diagnostic_log_entry(&self, category: &str, message: &str, context: Option<&str>) -> Result<()>;

    /// Players, then history, atomically.
    async fn persist_player_sync(
        &self,
        new: &[player::Model],
        updated: &[player::Model],
        history: &[HistoryEntry],
    ) -> Result<PlayerSyncWrite>;
}

/// [`Store`] over a sea-orm connection.
///
/// The connection is shared, so the store can be cloned and the caller can
/// keep querying through the same connection.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStore {
    /// Accepts an owned connection or one already behind an `Arc`.
    pub fn new(db: impl Into<Arc<DatabaseConnection>>) -> Self {
        Self { db: db.into() }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Store for SeaOrmStore {
    async fn get_teams(&self) -> Result<Vec<team::Model>> {
        get_teams(self.db.as_ref()).await
    }

    async fn save_new_and_updated_teams(
        &self,
        new: &[team::Model],
        updated: &[team::Model],
    ) -> Result<usize> {
        save_new_and_updated_teams(self.db.as_ref(), new, updated).await
    }

    async fn get_players_by_external_ids(
        &self,
        external_ids: &[i64],
        provider: Provider,
    ) -> Result<Vec<player::Model>> {
        get_players_by_external_ids(self.db.as_ref(), external_ids, provider).await
    }

    async fn save_new_and_updated_players(
        &self,
        new: &[player::Model],
        updated: &[player::Model],
    ) -> Result<usize> {
        let txn = self.db.begin().await?;
        let written = save_new_and_updated_players(&txn, new, updated).await?;
        txn.commit().await?;
        Ok(written)
    }

    async fn add_team_history_if_absent(&self, player_id: Uuid, team_id: Uuid, season: i32) -> Result<bool> {
        add_team_history_if_absent(self.db.as_ref(), player_id, team_id, season).await
    }

    async fn add_diagnostic_log_entry(&self, category: &str, message: &str, context: Option<&str>) -> Result<()> {
        add_diagnostic_log_entry(self.db.as_ref(), category, message, context).await
    }

    async fn persist_player_sync(
        &self,
        new: &[player::Model],
        updated: &[player::Model],
        history: &[HistoryEntry],
    ) -> Result<PlayerSyncWrite> {
        persist_player_sync(self.db.as_ref(), new, updated, history).await
    }
}
