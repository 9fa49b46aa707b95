//! SeaORM entity definitions for the roster database schema.

pub mod diagnostic_log;
pub mod external_identity;
pub mod player;
pub mod player_team_history;
pub mod prelude;
pub mod provider;
pub mod team;
