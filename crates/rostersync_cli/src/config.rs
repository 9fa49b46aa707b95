//! Configuration file support for rostersync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `ROSTERSYNC_`, `__` between
//!    sections, e.g. `ROSTERSYNC_NBA_API__API_KEY`)
//! 3. Config file (./rostersync.toml, then ~/.config/rostersync/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/rostersync/rostersync.db`
//! on Linux (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite:///var/lib/rostersync/rostersync.db?mode=rwc"
//!
//! [balldontlie]
//! api_key = "..."     # or ROSTERSYNC_BALLDONTLIE__API_KEY
//! page_size = 100
//!
//! [nba_api]
//! api_key = "..."     # or ROSTERSYNC_NBA_API__API_KEY
//! api_host = "api-nba-v1.p.rapidapi.com"
//!
//! [sync]
//! excluded_providers = ["balldontlie"]
//! seasons_back = 2
//! current_season = 2024
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Datelike;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use rostersync::provider::{ProviderSettings, rate_limits};
use rostersync::{Provider, balldontlie, nba_api};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub balldontlie: ProviderConfig,
    pub nba_api: ProviderConfig,
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// Connection settings for one roster provider.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Overrides the provider's public endpoint.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// RapidAPI host header (nba_api only).
    pub api_host: Option<String>,
    pub page_size: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            api_host: None,
            page_size: ProviderSettings::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Providers left out of player sync. They still feed team sync.
    pub excluded_providers: Vec<String>,
    /// How many seasons, counting back from `current_season`, to fetch.
    pub seasons_back: u32,
    /// The season to treat as current. Defaults to last calendar year.
    pub current_season: Option<i32>,
    /// Overrides every provider's default request rate.
    pub requests_per_second: Option<u32>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            excluded_providers: vec![Provider::BallDontLie.to_string()],
            seasons_back: 1,
            current_season: None,
            requests_per_second: None,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/rostersync/config.toml)
    /// 3. Local config file (./rostersync.toml)
    /// 4. Environment variables with ROSTERSYNC_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "rostersync") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("rostersync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./rostersync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// `ROSTERSYNC_SYNC__SEASONS_BACK` -> `sync.seasons_back`.
    ///
    /// A single underscore can't separate sections here because section and
    /// key names contain underscores themselves (`nba_api.api_key`).
    fn environment() -> Environment {
        Environment::with_prefix("ROSTERSYNC")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("sync.excluded_providers")
            .try_parsing(true)
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("rostersync.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/rostersync` or `~/.local/state/rostersync`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rostersync").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }

    /// The configured current season, or last calendar year.
    pub fn current_season(&self) -> i32 {
        self.sync
            .current_season
            .unwrap_or_else(|| chrono::Utc::now().year() - 1)
    }

    /// Seasons to fetch, oldest first, ending at the current season.
    pub fn seasons(&self) -> Vec<i32> {
        let current = self.current_season();
        let back = i32::try_from(self.sync.seasons_back.max(1)).unwrap_or(1);
        (current - back + 1..=current).collect()
    }

    /// Configured exclusions. Unknown provider names are ignored with a
    /// warning.
    pub fn excluded_providers(&self) -> BTreeSet<Provider> {
        self.sync
            .excluded_providers
            .iter()
            .filter_map(|name| match name.parse::<Provider>() {
                Ok(provider) => Some(provider),
                Err(e) => {
                    tracing::warn!(provider = %name, "Ignoring excluded provider: {}", e);
                    None
                }
            })
            .collect()
    }

    pub fn balldontlie_settings(&self) -> ProviderSettings {
        self.provider_settings(
            &self.balldontlie,
            balldontlie::DEFAULT_BASE_URL,
            rate_limits::BALLDONTLIE_DEFAULT_RPS,
        )
    }

    pub fn nba_api_settings(&self) -> ProviderSettings {
        let mut settings = self.provider_settings(
            &self.nba_api,
            nba_api::DEFAULT_BASE_URL,
            rate_limits::NBA_API_DEFAULT_RPS,
        );
        if settings.api_host.is_none() {
            settings.api_host = Some(nba_api::DEFAULT_HOST.to_string());
        }
        settings
    }

    fn provider_settings(&self, provider: &ProviderConfig, default_url: &str, default_rps: u32) -> ProviderSettings {
        let mut settings = ProviderSettings::new(provider.base_url.as_deref().unwrap_or(default_url));
        settings.api_key = provider.api_key.clone().filter(|k| !k.trim().is_empty());
        settings.api_host = provider.api_host.clone();
        settings.page_size = provider.page_size.max(1);
        settings.requests_per_second = self.sync.requests_per_second.unwrap_or(default_rps);
        settings
    }
}
