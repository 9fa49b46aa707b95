//! Progress reporting for sync runs.
//!
//! The engine never prints. It emits [`SyncProgress`] events through an
//! optional callback and the caller decides how to present them.

use crate::entity::provider::Provider;

/// Progress events emitted during team and player sync.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting to fetch teams from a provider.
    FetchingTeams { provider: Provider },

    /// A provider's team list has been fetched and parsed.
    FetchedTeams {
        provider: Provider,
        count: usize,
        /// Records that failed to parse.
        skipped: usize,
    },

    /// Cross-provider team merge finished.
    TeamsMerged {
        /// Raw records going in.
        fetched: usize,
        /// Clusters after fuzzy matching.
        merged: usize,
        /// Teams left after canonical filtering.
        canonical: usize,
    },

    /// Team rows written.
    TeamsPersisted { added: usize, updated: usize },

    /// Provider left out of player sync by configuration.
    ProviderExcluded { provider: Provider },

    /// Starting to fetch players from a provider.
    FetchingPlayers { provider: Provider },

    /// One page of a paginated fetch arrived.
    FetchedPage {
        provider: Provider,
        /// Page number (1-indexed).
        page: u32,
        /// Running total of items fetched so far.
        total_so_far: usize,
    },

    /// A provider's player rows have been fetched and parsed.
    FetchedPlayers {
        provider: Provider,
        count: usize,
        skipped: usize,
    },

    /// Reconciliation decisions for one provider.
    PlayersReconciled {
        provider: Provider,
        new: usize,
        updated: usize,
        unchanged: usize,
        history: usize,
    },

    /// Player and history rows written for one provider.
    PlayersPersisted {
        provider: Provider,
        players: usize,
        history: usize,
    },

    /// A provider failed; the run continues with the next one.
    ProviderFailed { provider: Provider, error: String },

    /// Non-fatal data problem.
    Warning { message: String },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        provider: Provider,
        retry_after_ms: u64,
        attempt: u32,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_with_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(
            Some(&callback),
            SyncProgress::FetchingTeams {
                provider: Provider::NbaApi,
            },
        );
        emit(
            Some(&callback),
            SyncProgress::TeamsPersisted {
                added: 30,
                updated: 0,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_callback() {
        emit(
            None,
            SyncProgress::Warning {
                message: "ignored".to_string(),
            },
        );
    }

    #[test]
    fn test_callback_sees_event_payload() {
        let seen: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |event| {
            capture.lock().unwrap().push(event);
        });

        emit(
            Some(&callback),
            SyncProgress::PlayersReconciled {
                provider: Provider::BallDontLie,
                new: 3,
                updated: 1,
                unchanged: 10,
                history: 2,
            },
        );

        let seen = seen.lock().unwrap();
        assert!(matches!(
            seen.as_slice(),
            [SyncProgress::PlayersReconciled { new: 3, updated: 1, .. }]
        ));
    }
}
