//! rostersync CLI - command-line interface for the roster reconciler.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::roster::OutputFormat;
use crate::commands::sync::SyncAction;

pub(crate) const BIN_NAME: &str = "rostersync";

#[derive(Parser)]
#[command(name = "rostersync")]
#[command(version)]
#[command(about = "Multi-provider basketball roster reconciliation")]
#[command(
    long_about = "rostersync pulls teams and players from several roster providers, merges \
each provider's view of a team into one canonical franchise, and keeps a per-provider \
player table with season-by-season team history."
)]
#[command(after_long_help = r#"EXAMPLES
    Create or upgrade the database schema:
        $ rostersync migrate up

    Sync teams, then players, from every provider:
        $ rostersync sync all

    Player sync only, including providers excluded by default:
        $ rostersync sync players --include-all

    Show the 2023 Celtics roster:
        $ rostersync roster BOS --season 2023

CONFIGURATION
    rostersync reads configuration from:
      1. ~/.config/rostersync/config.toml (or $XDG_CONFIG_HOME/rostersync/config.toml)
      2. ./rostersync.toml
      3. Environment variables (ROSTERSYNC_* prefix, `__` between sections)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    ROSTERSYNC_DATABASE__URL            Database connection string
    ROSTERSYNC_BALLDONTLIE__API_KEY     balldontlie API key
    ROSTERSYNC_NBA_API__API_KEY         RapidAPI key for api-nba
    ROSTERSYNC_SYNC__SEASONS_BACK       Seasons to fetch, counting back from the current one
    ROSTERSYNC_SYNC__EXCLUDED_PROVIDERS Comma-separated providers to skip in player sync
"#)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Sync teams and players from the roster providers
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Show the players recorded on a team for a season
    Roster {
        /// Team abbreviation (e.g. BOS, LAL)
        abbreviation: String,

        /// Season start year (default: the configured current season)
        #[arg(short, long)]
        season: Option<i32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

/// Install the tracing subscriber.
///
/// On a terminal the progress bars carry routine output, so only warnings are
/// logged unless `-v` is given. `RUST_LOG` overrides both.
fn init_tracing(verbose: u8, interactive: bool) {
    let default_filter = match (verbose, interactive) {
        (0, true) => "rostersync=warn,rostersync_cli=warn",
        (0, false) => "rostersync=info,rostersync_cli=info",
        (1, _) => "rostersync=debug,rostersync_cli=debug",
        _ => "rostersync=trace,rostersync_cli=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    // Strip query parameters (e.g., ?mode=rwc) before path operations
    let path = path.split('?').next().unwrap_or(path);
    let path = std::path::Path::new(path);

    if path.is_relative() && !path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            path.display()
        );
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let interactive = Term::stdout().is_term();
    init_tracing(cli.verbose, interactive);

    // Handle commands that don't require database access first
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    let config = config::Config::load();
    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set database.url or ROSTERSYNC_DATABASE__URL")?;
    ensure_sqlite_dir(&database_url)?;

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Sync { action } => {
            commands::sync::handle_sync(action, &config, &database_url, interactive).await?;
        }
        Commands::Roster {
            abbreviation,
            season,
            output,
        } => {
            commands::roster::handle_roster(&abbreviation, season, output, &config, &database_url).await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
