//! balldontlie API client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde_json::Value;

use super::convert::{to_player_record, to_team_record};
use super::types::{BdlMeta, BdlPlayer, BdlTeam};
use crate::entity::provider::Provider;
use crate::http::HttpTransport;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::provider::{
    ApiRateLimiter, Fetched, FetchedPages, LooseInt, PlayerRecord, ProviderClient, ProviderError,
    ProviderGateway, ProviderSettings, Result, TeamRecord,
};
use crate::sync::lookup::TeamLookup;
use crate::sync::ProgressCallback;

pub const DEFAULT_BASE_URL: &str = "https://api.balldontlie.io/v1/";

/// Read `meta.next_cursor`, which balldontlie sends as a number.
fn next_cursor(page: &Value) -> Option<String> {
    let meta: BdlMeta = serde_json::from_value(page.get("meta")?.clone()).ok()?;
    match meta.next_cursor? {
        LooseInt::Number(n) => Some(n.to_string()),
        LooseInt::Text(s) => Some(s).filter(|s| !s.is_empty()),
    }
}

#[derive(Clone)]
pub struct BallDontLieClient {
    gateway: ProviderGateway,
    settings: ProviderSettings,
    season: i32,
}

impl BallDontLieClient {
    /// Create a client backed by reqwest.
    ///
    /// `season` is stamped on every player row, since the players endpoint
    /// describes the current season only.
    pub fn new(settings: ProviderSettings, season: i32) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(|e| ProviderError::config(e.to_string()))?;
        Ok(Self::new_with_transport(settings, season, Arc::new(transport)))
    }

    pub fn new_with_transport(
        settings: ProviderSettings,
        season: i32,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let limiter = ApiRateLimiter::new(settings.requests_per_second);
        Self {
            gateway: ProviderGateway::new(Provider::BallDontLie, transport, Some(limiter)),
            settings,
            season,
        }
    }

    async fn fetch(&self, url: &str, on_progress: Option<&ProgressCallback>) -> FetchedPages {
        self.gateway
            .fetch_pages(
                url,
                self.settings.api_key.as_deref(),
                next_cursor,
                &Vec::new(),
                on_progress,
            )
            .await
    }
}

/// Fold a pagination failure into `fetched`, or return it when nothing at
/// all came back.
fn settle<T>(mut fetched: Fetched<T>, pages: &FetchedPages, error: Option<ProviderError>) -> Result<Fetched<T>> {
    match error {
        Some(e) if pages.pages.is_empty() => Err(e),
        Some(e) => {
            fetched.fail(Provider::BallDontLie, e);
            Ok(fetched)
        }
        None => Ok(fetched),
    }
}

#[async_trait]
impl ProviderClient for BallDontLieClient {
    fn provider(&self) -> Provider {
        Provider::BallDontLie
    }

    #[tracing::instrument(skip_all, fields(provider = "balldontlie"))]
    async fn fetch_teams(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Fetched<TeamRecord>> {
        let mut pages = self.fetch(&self.settings.endpoint("teams"), on_progress).await;
        let error = pages.error.take();

        let mut fetched = Fetched::default();
        for page in &pages.pages {
            fetched.extend_from_page(Provider::BallDontLie, page, "data", |team: BdlTeam| {
                to_team_record(team)
            });
        }

        settle(fetched, &pages, error)
    }

    #[tracing::instrument(skip_all, fields(provider = "balldontlie", season = self.season))]
    async fn fetch_players(
        &self,
        _teams: &TeamLookup,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Fetched<PlayerRecord>> {
        let url = self
            .settings
            .endpoint(&format!("players?per_page={}", self.settings.page_size));
        let mut pages = self.fetch(&url, on_progress).await;
        let error = pages.error.take();

        let season = self.season;
        let mut fetched = Fetched::default();
        for page in &pages.pages {
            fetched.extend_from_page(Provider::BallDontLie, page, "data", |player: BdlPlayer| {
                to_player_record(player, season)
            });
        }

        settle(fetched, &pages, error)
    }
}
