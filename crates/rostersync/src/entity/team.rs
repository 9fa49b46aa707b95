//! Team entity: one row per canonical franchise.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A canonical franchise, merged across every provider that reports it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // ─── Display ─────────────────────────────────────────────────────────────
    pub city: Option<String>,
    /// Short name, e.g. "Lakers".
    pub name: String,
    /// Canonical full name, e.g. "Los Angeles Lakers". Unique.
    #[sea_orm(unique)]
    pub full_name: String,
    /// Tricode, e.g. "LAL".
    pub abbreviation: String,
    pub conference: Option<String>,
    pub division: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub logo_url: Option<String>,
    pub nickname: Option<String>,

    // ─── Identity ────────────────────────────────────────────────────────────
    /// Provider name -> `{ "id": <external id> }`.
    #[sea_orm(column_type = "Json")]
    pub external_ids: serde_json::Value,

    // ─── Tracking ────────────────────────────────────────────────────────────
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::player::Entity")]
    Player,
    #[sea_orm(has_many = "super::player_team_history::Entity")]
    History,
}

impl Related<super::player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl Related<super::player_team_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
