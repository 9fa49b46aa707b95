use rostersync::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchingTeams { provider } => {
                tracing::info!(provider = %provider, "Fetching teams");
            }

            SyncProgress::FetchedTeams {
                provider,
                count,
                skipped,
            } => {
                tracing::info!(provider = %provider, count, skipped, "Fetched teams");
            }

            SyncProgress::TeamsMerged {
                fetched,
                merged,
                canonical,
            } => {
                tracing::info!(fetched, merged, canonical, "Merged teams across providers");
            }

            SyncProgress::TeamsPersisted { added, updated } => {
                tracing::info!(added, updated, "Saved teams");
            }

            SyncProgress::ProviderExcluded { provider } => {
                tracing::info!(provider = %provider, "Skipping player sync (excluded)");
            }

            SyncProgress::FetchingPlayers { provider } => {
                tracing::info!(provider = %provider, "Fetching players");
            }

            SyncProgress::FetchedPage {
                provider,
                page,
                total_so_far,
            } => {
                tracing::debug!(provider = %provider, page, total_so_far, "Fetched page");
            }

            SyncProgress::FetchedPlayers {
                provider,
                count,
                skipped,
            } => {
                tracing::info!(provider = %provider, count, skipped, "Fetched players");
            }

            SyncProgress::PlayersReconciled {
                provider,
                new,
                updated,
                unchanged,
                history,
            } => {
                tracing::info!(provider = %provider, new, updated, unchanged, history, "Reconciled players");
            }

            SyncProgress::PlayersPersisted {
                provider,
                players,
                history,
            } => {
                tracing::info!(provider = %provider, players, history, "Saved players");
            }

            SyncProgress::ProviderFailed { provider, error } => {
                tracing::error!(provider = %provider, error = %error, "Provider failed");
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            SyncProgress::RateLimitBackoff {
                provider,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(
                    provider = %provider,
                    retry_after_ms,
                    attempt,
                    "Rate limited, backing off"
                );
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
