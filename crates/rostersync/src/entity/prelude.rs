//! Common re-exports for convenient entity usage.

pub use super::diagnostic_log::{
    ActiveModel as DiagnosticLogActiveModel, Entity as DiagnosticLog,
    Model as DiagnosticLogModel,
};
pub use super::external_identity::{
    ActiveModel as ExternalIdentityActiveModel, EntityKind, Entity as ExternalIdentity,
    Model as ExternalIdentityModel,
};
pub use super::player::{
    ActiveModel as PlayerActiveModel, Column as PlayerColumn, Entity as Player,
    Model as PlayerModel,
};
pub use super::player_team_history::{
    ActiveModel as PlayerTeamHistoryActiveModel, Column as PlayerTeamHistoryColumn,
    Entity as PlayerTeamHistory, Model as PlayerTeamHistoryModel,
};
pub use super::provider::Provider;
pub use super::team::{
    ActiveModel as TeamActiveModel, Column as TeamColumn, Entity as Team, Model as TeamModel,
};
