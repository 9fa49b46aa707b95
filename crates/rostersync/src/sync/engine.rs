//! The sync orchestrator.
//!
//! [`SyncEngine`] drives one run: team sync builds the canonical team table
//! from every provider, player sync reconciles each provider's players against
//! it. Providers are processed one after another. A provider that fails is
//! recorded in [`SyncResult::errors`] and the run moves on; only store
//! failures abort.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rostersync::store::SeaOrmStore;
//! use rostersync::sync::{SyncEngine, SyncOptions};
//!
//! let store = Arc::new(SeaOrmStore::new(db));
//! let engine = SyncEngine::new(store, vec![balldontlie, nba_api], SyncOptions::default());
//! let result = engine.run_full_sync(None).await?;
//! println!("{} teams added, {} players added", result.teams.added, result.players.added);
//! ```

use std::sync::Arc;

use chrono::Utc;

use super::lookup::TeamLookup;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::reconcile::{ReconcileContext, group_versions, own_external_ids, reconcile_players};
use super::types::{FullSyncResult, Result, SyncError, SyncOptions, SyncResult};
use crate::entity::provider::Provider;
use crate::provider::{ProviderClient, ProviderError, short_error_message};
use crate::store::Store;
use crate::teams::{GreedyClusterer, TeamClusterer, diff_teams, prepare_teams};

/// Runs team and player sync over a fixed set of provider clients.
pub struct SyncEngine {
    store: Arc<dyn Store>,
    clients: Vec<Arc<dyn ProviderClient>>,
    options: SyncOptions,
    clusterer: Box<dyn TeamClusterer>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn Store>, clients: Vec<Arc<dyn ProviderClient>>, options: SyncOptions) -> Self {
        Self {
            store,
            clients,
            options,
            clusterer: Box::new(GreedyClusterer::default()),
        }
    }

    /// Replace the default fuzzy clusterer.
    pub fn with_clusterer(mut self, clusterer: Box<dyn TeamClusterer>) -> Self {
        self.clusterer = clusterer;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    fn providers(&self) -> Vec<Provider> {
        self.clients.iter().map(|c| c.provider()).collect()
    }

    fn provider_failed(
        provider: Provider,
        error: &ProviderError,
        result: &mut SyncResult,
        on_progress: Option<&ProgressCallback>,
    ) {
        let message = short_error_message(error);
        tracing::error!(%provider, error = %message, "Provider failed; continuing with the next one");
        result.errors.push(format!("{provider}: {message}"));
        emit(
            on_progress,
            SyncProgress::ProviderFailed {
                provider,
                error: message,
            },
        );
    }

    /// Fetch teams from every provider, merge them into the canonical
    /// franchise list and persist new or changed rows.
    #[tracing::instrument(skip_all, fields(providers = ?self.providers()))]
    pub async fn run_team_sync(&self, on_progress: Option<&ProgressCallback>) -> Result<SyncResult> {
        if self.clients.is_empty() {
            return Err(SyncError::NoProviders);
        }

        let mut result = SyncResult::default();
        let mut raw = Vec::new();

        for client in &self.clients {
            let provider = client.provider();
            emit(on_progress, SyncProgress::FetchingTeams { provider });

            match client.fetch_teams(on_progress).await {
                Ok(fetched) => {
                    tracing::debug!(
                        %provider,
                        count = fetched.items.len(),
                        skipped = fetched.skipped,
                        "Fetched teams"
                    );
                    emit(
                        on_progress,
                        SyncProgress::FetchedTeams {
                            provider,
                            count: fetched.items.len(),
                            skipped: fetched.skipped,
                        },
                    );
                    result.skipped += fetched.skipped;
                    result.errors.extend(fetched.errors);
                    raw.extend(fetched.items);
                }
                Err(e) => Self::provider_failed(provider, &e, &mut result, on_progress),
            }
        }

        let fetched = raw.len();
        let prepared = prepare_teams(&raw, self.clusterer.as_ref());
        emit(
            on_progress,
            SyncProgress::TeamsMerged {
                fetched,
                merged: prepared.merged,
                canonical: prepared.teams.len(),
            },
        );

        let existing = self.store.get_teams().await?;
        let diff = diff_teams(prepared.teams, &existing, Utc::now().fixed_offset());
        self.store
            .save_new_and_updated_teams(&diff.new, &diff.updated)
            .await?;

        result.added = diff.new.len();
        result.updated = diff.updated.len();
        emit(
            on_progress,
            SyncProgress::TeamsPersisted {
                added: result.added,
                updated: result.updated,
            },
        );
        tracing::info!(
            added = result.added,
            updated = result.updated,
            unchanged = diff.unchanged,
            errors = result.errors.len(),
            "Team sync finished"
        );

        Ok(result)
    }

    /// Reconcile each included provider's players against the store.
    ///
    /// Each provider's players and history are written in one transaction
    /// before the next provider is fetched.
    #[tracing::instrument(skip_all, fields(providers = ?self.providers(), existence_only = self.options.existence_only))]
    pub async fn run_player_sync(&self, on_progress: Option<&ProgressCallback>) -> Result<SyncResult> {
        if self.clients.is_empty() {
            return Err(SyncError::NoProviders);
        }

        let teams = self.store.get_teams().await?;
        let lookup = TeamLookup::from_teams(&teams);
        if lookup.is_empty() {
            tracing::warn!("No persisted teams; every player will be unassigned");
        }

        let now = Utc::now().fixed_offset();
        let mut result = SyncResult::default();

        for client in &self.clients {
            let provider = client.provider();
            if self.options.is_excluded(provider) {
                tracing::info!(%provider, "Provider excluded from player sync");
                emit(on_progress, SyncProgress::ProviderExcluded { provider });
                continue;
            }

            emit(on_progress, SyncProgress::FetchingPlayers { provider });
            let fetched = match client.fetch_players(&lookup, on_progress).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    Self::provider_failed(provider, &e, &mut result, on_progress);
                    continue;
                }
            };
            emit(
                on_progress,
                SyncProgress::FetchedPlayers {
                    provider,
                    count: fetched.items.len(),
                    skipped: fetched.skipped,
                },
            );
            result.skipped += fetched.skipped;
            result.errors.extend(fetched.errors);

            let grouped = group_versions(fetched.items);
            if grouped.duplicates > 0 {
                tracing::debug!(%provider, duplicates = grouped.duplicates, "Dropped repeated player rows");
            }
            let ids = own_external_ids(&grouped, provider);
            let existing = self
                .store
                .get_players_by_external_ids(&ids, provider)
                .await?;

            let ctx = ReconcileContext {
                provider,
                lookup: &lookup,
                existence_only: self.options.existence_only,
                now,
            };
            let reconciled = reconcile_players(&ctx, grouped, existing);
            emit(
                on_progress,
                SyncProgress::PlayersReconciled {
                    provider,
                    new: reconciled.new_players.len(),
                    updated: reconciled.updated_players.len(),
                    unchanged: reconciled.unchanged,
                    history: reconciled.history.len(),
                },
            );

            for warning in &reconciled.warnings {
                self.store
                    .add_diagnostic_log_entry(warning.category, &warning.message, warning.context.as_deref())
                    .await?;
                emit(
                    on_progress,
                    SyncProgress::Warning {
                        message: warning.message.clone(),
                    },
                );
            }

            let write = self
                .store
                .persist_player_sync(
                    &reconciled.new_players,
                    &reconciled.updated_players,
                    &reconciled.history,
                )
                .await?;
            emit(
                on_progress,
                SyncProgress::PlayersPersisted {
                    provider,
                    players: write.players,
                    history: write.history_added,
                },
            );
            tracing::info!(
                %provider,
                added = reconciled.new_players.len(),
                updated = reconciled.updated_players.len(),
                unchanged = reconciled.unchanged,
                history = write.history_added,
                "Player sync finished for provider"
            );

            result.added += reconciled.new_players.len();
            result.updated += reconciled.updated_players.len();
            result.history_added += write.history_added;
        }

        Ok(result)
    }

    /// Team sync, then player sync against the teams it just wrote.
    pub async fn run_full_sync(&self, on_progress: Option<&ProgressCallback>) -> Result<FullSyncResult> {
        let teams = self.run_team_sync(on_progress).await?;
        let players = self.run_player_sync(on_progress).await?;
        Ok(FullSyncResult { teams, players })
    }
}
