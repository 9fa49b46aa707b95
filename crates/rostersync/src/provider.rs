//! Provider-agnostic client interface and shared fetch plumbing.
//!
//! Every roster source implements [`ProviderClient`]. The concrete clients in
//! [`crate::balldontlie`] and [`crate::nba_api`] share the [`ProviderGateway`]
//! for paging, pacing and 429 backoff.

mod errors;
pub mod gateway;
mod rate_limit;
mod types;

pub use errors::{ProviderError, Result, short_error_message};
pub use gateway::{FetchedPages, ProviderGateway, TeamSeasonPage, TeamSeasonPages};
pub use rate_limit::{ApiRateLimiter, rate_limits};
pub use types::{Fetched, LooseInt, PlayerRecord, ProviderClient, TeamRecord, non_blank};

/// Settings shared by every HTTP-backed provider client.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL, with or without a trailing slash.
    pub base_url: String,
    pub api_key: Option<String>,
    /// Value for the RapidAPI host header, where the provider needs one.
    pub api_host: Option<String>,
    pub page_size: u32,
    pub requests_per_second: u32,
}

impl ProviderSettings {
    pub const DEFAULT_PAGE_SIZE: u32 = 50;

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            api_host: None,
            page_size: Self::DEFAULT_PAGE_SIZE,
            requests_per_second: rate_limits::BALLDONTLIE_DEFAULT_RPS,
        }
    }

    /// `base_url` joined with `path`, with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
