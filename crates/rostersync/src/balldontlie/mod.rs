//! balldontlie.io client.
//!
//! - [`types`] - Response shapes
//! - [`convert`] - One typed mapping per record into canonical records
//! - [`client`] - Cursor-paginated fetching

mod client;
mod convert;
pub mod types;

pub use client::{BallDontLieClient, DEFAULT_BASE_URL};
pub use convert::{to_player_record, to_team_record};
