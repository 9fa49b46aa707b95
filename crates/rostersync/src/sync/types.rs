//! Sync options, results and errors.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::entity::provider::Provider;
use crate::store::StoreError;

/// Result of a team or player sync pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Rows inserted.
    pub added: usize,
    /// Rows updated in place.
    pub updated: usize,
    /// Records dropped because they failed to parse.
    pub skipped: usize,
    /// History rows added (player sync only).
    pub history_added: usize,
    /// Non-fatal errors, one line each.
    pub errors: Vec<String>,
}

impl SyncResult {
    /// Fold another pass's counts into this one.
    pub fn absorb(&mut self, other: SyncResult) {
        self.added += other.added;
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.history_added += other.history_added;
        self.errors.extend(other.errors);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Team sync and player sync results of a full run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FullSyncResult {
    pub teams: SyncResult,
    pub players: SyncResult,
}

/// Options for a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Providers skipped during player sync. They still take part in team
    /// sync.
    pub excluded_providers: BTreeSet<Provider>,
    /// Only insert players that don't exist yet; never update.
    pub existence_only: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            excluded_providers: BTreeSet::from([Provider::BallDontLie]),
            existence_only: false,
        }
    }
}

impl SyncOptions {
    /// Options that run player sync for every provider.
    pub fn include_all() -> Self {
        Self {
            excluded_providers: BTreeSet::new(),
            ..Self::default()
        }
    }

    pub fn is_excluded(&self, provider: Provider) -> bool {
        self.excluded_providers.contains(&provider)
    }
}

/// A failure that aborts the whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The engine was built without any provider client.
    #[error("no provider clients configured")]
    NoProviders,
}

pub type Result<T> = std::result::Result<T, SyncError>;
