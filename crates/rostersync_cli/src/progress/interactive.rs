use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rostersync::Provider;
use rostersync::sync::SyncProgress;

/// Interactive progress reporter using indicatif.
///
/// One spinner per provider and phase. Merge and persistence summaries are
/// printed above the bars.
pub struct InteractiveReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<Provider, ProgressBar>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    pub fn handle(&self, event: SyncProgress) {
        let mut bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);

        match event {
            SyncProgress::FetchingTeams { provider } => {
                let pb = self.spinner(provider, "Fetching teams...");
                if let Some(old) = bars.insert(provider, pb) {
                    old.finish_and_clear();
                }
            }

            SyncProgress::FetchedTeams {
                provider,
                count,
                skipped,
            } => {
                if let Some(pb) = bars.remove(&provider) {
                    pb.finish_with_message(with_skipped(format!("✓ {count} teams"), skipped));
                }
            }

            SyncProgress::TeamsMerged {
                fetched,
                merged,
                canonical,
            } => {
                self.multi
                    .println(format!("Merged {fetched} records into {merged} teams ({canonical} franchises)"))
                    .ok();
            }

            SyncProgress::TeamsPersisted { added, updated } => {
                self.multi
                    .println(format!("Teams: {added} added, {updated} updated"))
                    .ok();
            }

            SyncProgress::ProviderExcluded { provider } => {
                self.multi
                    .println(format!("{provider}: excluded from player sync"))
                    .ok();
            }

            SyncProgress::FetchingPlayers { provider } => {
                let pb = self.spinner(provider, "Fetching players...");
                if let Some(old) = bars.insert(provider, pb) {
                    old.finish_and_clear();
                }
            }

            SyncProgress::FetchedPage {
                provider,
                page,
                total_so_far,
            } => {
                if let Some(pb) = bars.get(&provider) {
                    pb.set_message(format!("Page {page} ({total_so_far} records)"));
                }
            }

            SyncProgress::FetchedPlayers {
                provider,
                count,
                skipped,
            } => {
                if let Some(pb) = bars.get(&provider) {
                    pb.set_message(with_skipped(format!("{count} rows, reconciling..."), skipped));
                }
            }

            SyncProgress::PlayersReconciled {
                provider,
                new,
                updated,
                unchanged,
                history,
            } => {
                if let Some(pb) = bars.get(&provider) {
                    pb.set_message(format!(
                        "{new} new, {updated} updated, {unchanged} unchanged, {history} history, saving..."
                    ));
                }
            }

            SyncProgress::PlayersPersisted {
                provider,
                players,
                history,
            } => {
                if let Some(pb) = bars.remove(&provider) {
                    pb.finish_with_message(format!("✓ {players} players saved, {history} history rows"));
                }
            }

            SyncProgress::ProviderFailed { provider, error } => {
                match bars.remove(&provider) {
                    Some(pb) => pb.abandon_with_message(format!("✗ {error}")),
                    None => {
                        self.multi.println(format!("✗ {provider}: {error}")).ok();
                    }
                }
            }

            SyncProgress::Warning { message } => {
                // Release lock before printing to avoid holding it during I/O
                drop(bars);
                self.multi.println(format!("⚠ {message}")).ok();
            }

            SyncProgress::RateLimitBackoff {
                provider,
                retry_after_ms,
                attempt,
            } => {
                if let Some(pb) = bars.get(&provider) {
                    pb.set_message(format!(
                        "⏳ rate limited, retry {} in {:.1}s",
                        attempt,
                        retry_after_ms as f64 / 1000.0
                    ));
                }
            }

            _ => {}
        }
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
        for pb in bars.values() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn spinner(&self, provider: Provider, message: &'static str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(format!("{:12}", provider.as_str()));
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "))
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn with_skipped(message: String, skipped: usize) -> String {
    if skipped > 0 {
        format!("{message} ({skipped} skipped)")
    } else {
        message
    }
}
