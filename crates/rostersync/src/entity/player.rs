//! Player entity: the latest known observation of one provider's player.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::provider::Provider;

/// A player as last reported by its owning provider.
///
/// `current_team_id` is `None` when the player's team could not be resolved
/// against the persisted teams (the "unassigned" state).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Provider whose id space this row belongs to.
    pub provider: Provider,

    // ─── Identity ────────────────────────────────────────────────────────────
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    /// Feet-inches, e.g. "6-6".
    pub height: Option<String>,
    /// Pounds.
    pub weight: Option<i32>,
    pub jersey_number: Option<String>,
    pub college: Option<String>,
    pub country: Option<String>,

    // ─── Career ──────────────────────────────────────────────────────────────
    pub draft_year: Option<i32>,
    pub draft_round: Option<i32>,
    pub draft_number: Option<i32>,
    #[sea_orm(default_value = true)]
    pub is_active: bool,
    /// First NBA season.
    pub start_year: Option<i32>,

    // ─── Season ──────────────────────────────────────────────────────────────
    /// Season this observation describes (the year the season started).
    pub season: i32,
    pub current_team_id: Option<Uuid>,

    /// Provider name -> `{ "id": <external id> }`.
    #[sea_orm(column_type = "Json")]
    pub external_ids: serde_json::Value,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::CurrentTeamId",
        to = "super::team::Column::Id",
        on_delete = "SetNull"
    )]
    Team,
    #[sea_orm(has_many = "super::player_team_history::Entity")]
    History,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::player_team_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// "First Last", trimmed when either part is empty.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
