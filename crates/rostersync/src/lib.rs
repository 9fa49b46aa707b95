//! rostersync - multi-provider basketball roster reconciliation.
//!
//! This library pulls teams and players from several roster providers, merges
//! the providers' views of each team into one canonical row, and keeps a
//! per-provider player table with season-aware team history.
//!
//! # Features
//!
//! - `sqlite` (default) - SQLite backend.
//! - `postgres` - PostgreSQL backend.
//! - `migrate` (default) - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to automatically run migrations on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rostersync::{SeaOrmStore, SyncEngine, SyncOptions, connect_and_migrate};
//!
//! let db = connect_and_migrate("sqlite://rostersync.db?mode=rwc").await?;
//! let store = Arc::new(SeaOrmStore::new(db));
//! let engine = SyncEngine::new(store, clients, SyncOptions::default());
//!
//! let result = engine.run_full_sync(None).await?;
//! println!("{} teams, {} players added", result.teams.added, result.players.added);
//! ```

pub mod balldontlie;
pub mod db;
pub mod entity;
pub mod http;
pub mod identity;
pub mod nba_api;
pub mod provider;
pub mod retry;
pub mod store;
pub mod sync;
pub mod teams;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use identity::{ExternalId, IdentityError};
pub use provider::{
    ApiRateLimiter, Fetched, PlayerRecord, ProviderClient, ProviderError, ProviderSettings,
    TeamRecord, rate_limits,
};
pub use store::{SeaOrmStore, Store, StoreError};
pub use sync::{FullSyncResult, SyncEngine, SyncError, SyncOptions, SyncProgress, SyncResult};
