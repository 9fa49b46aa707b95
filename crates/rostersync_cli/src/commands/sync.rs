//! `rostersync sync`: run team and/or player sync against every provider.

use std::sync::Arc;

use clap::{Args, Subcommand};
use console::style;

use rostersync::balldontlie::BallDontLieClient;
use rostersync::nba_api::NbaApiClient;
use rostersync::{
    Provider, ProviderClient, SeaOrmStore, SyncEngine, SyncOptions, SyncResult, connect_and_migrate,
};

use crate::config::Config;
use crate::progress::ProgressReporter;

/// Sync subcommands.
#[derive(Subcommand)]
pub enum SyncAction {
    /// Fetch teams from every provider and merge them into canonical franchises
    Teams(SyncArgs),
    /// Reconcile players against the persisted teams
    Players(SyncArgs),
    /// Team sync, then player sync
    All(SyncArgs),
}

/// Options shared by every sync subcommand.
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Leave a provider out of player sync (repeatable; replaces the configured list)
    #[arg(short = 'x', long = "exclude", value_name = "PROVIDER")]
    exclude: Vec<Provider>,

    /// Run player sync for every provider, ignoring configured exclusions
    #[arg(long, conflicts_with = "exclude")]
    include_all: bool,

    /// Only insert players that don't exist yet; never update existing ones
    #[arg(long)]
    existence_only: bool,
}

impl SyncArgs {
    fn options(&self, config: &Config) -> SyncOptions {
        let excluded_providers = if self.include_all {
            Default::default()
        } else if !self.exclude.is_empty() {
            self.exclude.iter().copied().collect()
        } else {
            config.excluded_providers()
        };
        SyncOptions {
            excluded_providers,
            existence_only: self.existence_only,
        }
    }
}

fn build_clients(config: &Config) -> Result<Vec<Arc<dyn ProviderClient>>, Box<dyn std::error::Error>> {
    let balldontlie = BallDontLieClient::new(config.balldontlie_settings(), config.current_season())?;
    let nba_api = NbaApiClient::new(config.nba_api_settings(), config.seasons())?;
    Ok(vec![
        Arc::new(balldontlie) as Arc<dyn ProviderClient>,
        Arc::new(nba_api) as Arc<dyn ProviderClient>,
    ])
}

/// Handle sync commands.
pub async fn handle_sync(
    action: SyncAction,
    config: &Config,
    database_url: &str,
    interactive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let args = match &action {
        SyncAction::Teams(args) | SyncAction::Players(args) | SyncAction::All(args) => args,
    };
    let options = args.options(config);
    tracing::debug!(?options, seasons = ?config.seasons(), "Starting sync");

    let db = connect_and_migrate(database_url).await?;
    let engine = SyncEngine::new(Arc::new(SeaOrmStore::new(db)), build_clients(config)?, options);

    let reporter = Arc::new(ProgressReporter::new(interactive));
    let callback = reporter.as_callback();
    let on_progress = Some(callback.as_ref());

    let outcome = match action {
        SyncAction::Teams(_) => engine
            .run_team_sync(on_progress)
            .await
            .map(|teams| vec![("Teams", teams)]),
        SyncAction::Players(_) => engine
            .run_player_sync(on_progress)
            .await
            .map(|players| vec![("Players", players)]),
        SyncAction::All(_) => engine
            .run_full_sync(on_progress)
            .await
            .map(|full| vec![("Teams", full.teams), ("Players", full.players)]),
    };
    reporter.finish();

    for (label, result) in outcome? {
        print_result(label, &result);
    }
    Ok(())
}

fn print_result(label: &str, result: &SyncResult) {
    let mut line = format!(
        "{} {} added, {} updated",
        style(format!("{label}:")).bold(),
        result.added,
        result.updated
    );
    if result.history_added > 0 {
        line.push_str(&format!(", {} history rows", result.history_added));
    }
    if result.skipped > 0 {
        line.push_str(&format!(", {} skipped", result.skipped));
    }
    println!("{line}");

    const MAX_SHOWN: usize = 10;
    if !result.is_clean() {
        eprintln!(
            "{}",
            style(format!("{} provider error(s):", result.errors.len())).yellow()
        );
        for error in result.errors.iter().take(MAX_SHOWN) {
            eprintln!("  - {error}");
        }
        if result.errors.len() > MAX_SHOWN {
            eprintln!("  ... and {} more", result.errors.len() - MAX_SHOWN);
        }
    }
}
