//! Roster sync: turning provider data into persisted teams, players and
//! history.
//!
//! # Module Structure
//!
//! - [`types`] - `SyncResult`, `SyncOptions`, `SyncError`
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`lookup`] - `TeamLookup`, provider team id -> persisted team
//! - [`reconcile`] - Pure player reconciliation and history derivation
//! - [`engine`] - `SyncEngine`, which drives a run against a [`Store`](crate::store::Store)

pub mod engine;
pub mod lookup;
mod progress;
pub mod reconcile;
mod types;

pub use engine::SyncEngine;
pub use lookup::TeamLookup;
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use reconcile::{
    Diagnostic, GroupedVersions, ProviderReconciliation, ReconcileContext, authoritative,
    group_versions, reconcile_players,
};
pub use types::{FullSyncResult, Result, SyncError, SyncOptions, SyncResult};
