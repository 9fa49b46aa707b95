//! api-sports NBA v2 client, served through RapidAPI.
//!
//! Teams come from a single `/teams` call. Players are only listable per team
//! and season, so player sync fans out over the persisted teams' nba_api ids.

mod client;
mod convert;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_HOST, NbaApiClient};
pub use convert::{to_player_record, to_team_record};
