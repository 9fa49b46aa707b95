//! api-sports NBA client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;

use super::convert::{to_player_record, to_team_record};
use super::types::{NbaPlayer, NbaTeam};
use crate::entity::provider::Provider;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpHeaders, HttpTransport};
use crate::provider::{
    ApiRateLimiter, Fetched, PlayerRecord, ProviderClient, ProviderError, ProviderGateway,
    ProviderSettings, Result, TeamRecord,
};
use crate::sync::lookup::TeamLookup;
use crate::sync::ProgressCallback;

pub const DEFAULT_BASE_URL: &str = "https://api-nba-v1.p.rapidapi.com/";
pub const DEFAULT_HOST: &str = "api-nba-v1.p.rapidapi.com";

#[derive(Clone)]
pub struct NbaApiClient {
    gateway: ProviderGateway,
    settings: ProviderSettings,
    seasons: Vec<i32>,
}

impl NbaApiClient {
    /// Create a client backed by reqwest that syncs rosters for `seasons`.
    pub fn new(settings: ProviderSettings, seasons: Vec<i32>) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(|e| ProviderError::config(e.to_string()))?;
        Ok(Self::new_with_transport(settings, seasons, Arc::new(transport)))
    }

    pub fn new_with_transport(
        settings: ProviderSettings,
        seasons: Vec<i32>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let limiter = ApiRateLimiter::new(settings.requests_per_second);
        Self {
            gateway: ProviderGateway::new(Provider::NbaApi, transport, Some(limiter)),
            settings,
            seasons,
        }
    }

    /// RapidAPI headers; each is only sent when configured.
    fn headers(&self) -> HttpHeaders {
        let mut headers = Vec::new();
        if let Some(key) = self.settings.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            headers.push(("x-rapidapi-key".to_string(), key.to_string()));
        }
        if let Some(host) = self.settings.api_host.as_deref().filter(|h| !h.trim().is_empty()) {
            headers.push(("x-rapidapi-host".to_string(), host.to_string()));
        }
        headers
    }
}

#[async_trait]
impl ProviderClient for NbaApiClient {
    fn provider(&self) -> Provider {
        Provider::NbaApi
    }

    #[tracing::instrument(skip_all, fields(provider = "nba_api"))]
    async fn fetch_teams(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Fetched<TeamRecord>> {
        let page = self
            .gateway
            .get_json(&self.settings.endpoint("teams"), &self.headers(), on_progress)
            .await?;

        let mut fetched = Fetched::default();
        fetched.extend_from_page(Provider::NbaApi, &page, "response", |team: NbaTeam| {
            to_team_record(team)
        });

        Ok(fetched)
    }

    #[tracing::instrument(skip_all, fields(provider = "nba_api", seasons = ?self.seasons))]
    async fn fetch_players(
        &self,
        teams: &TeamLookup,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Fetched<PlayerRecord>> {
        let team_ids = teams.external_ids(Provider::NbaApi);
        if team_ids.is_empty() {
            tracing::warn!("No persisted team carries an nba_api id; run team sync first");
        }

        let pages = self
            .gateway
            .fetch_for_teams_and_seasons(
                &team_ids,
                &self.seasons,
                |team, season| {
                    self.settings
                        .endpoint(&format!("players?team={team}&season={season}"))
                },
                &self.headers(),
                on_progress,
            )
            .await;

        let mut fetched = Fetched::default();
        for page in &pages.pages {
            let (team_id, season) = (page.team_id, page.season);
            fetched.extend_from_page(Provider::NbaApi, &page.body, "response", |player: NbaPlayer| {
                to_player_record(player, team_id, season)
            });
        }

        let mut errors = pages.errors.into_iter();
        if pages.pages.is_empty()
            && let Some(first) = errors.next()
        {
            return Err(first);
        }
        for error in errors {
            fetched.fail(Provider::NbaApi, error);
        }

        Ok(fetched)
    }
}
