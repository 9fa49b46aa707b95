//! Paginated JSON fetching shared by the provider clients.
//!
//! The gateway owns the transport, request pacing and 429 backoff. It hands
//! back raw JSON pages; turning them into records is the client's job.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::entity::provider::Provider;
use crate::http::{HttpHeaders, HttpRequest, HttpTransport};
use crate::retry::{RetryConfig, with_retry};
use crate::sync::{ProgressCallback, SyncProgress, emit};

use super::errors::{ProviderError, Result};
use super::rate_limit::ApiRateLimiter;

/// Hard stop for cursor pagination.
const MAX_PAGES: u32 = 10_000;

/// Longest error body kept in an [`ProviderError::Api`] message.
const MAX_ERROR_BODY: usize = 200;

/// Pages collected by one pagination loop.
#[derive(Debug, Default)]
pub struct FetchedPages {
    pub pages: Vec<Value>,
    /// Set when the loop stopped early. Pages before the failure are kept.
    pub error: Option<ProviderError>,
}

/// One response from a per-team, per-season fan-out.
#[derive(Debug, Clone)]
pub struct TeamSeasonPage {
    pub team_id: i64,
    pub season: i32,
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct TeamSeasonPages {
    pub pages: Vec<TeamSeasonPage>,
    pub errors: Vec<ProviderError>,
}

#[derive(Clone)]
pub struct ProviderGateway {
    provider: Provider,
    transport: Arc<dyn HttpTransport>,
    rate_limiter: Option<ApiRateLimiter>,
    retry: RetryConfig,
}

impl ProviderGateway {
    pub fn new(
        provider: Provider,
        transport: Arc<dyn HttpTransport>,
        rate_limiter: Option<ApiRateLimiter>,
    ) -> Self {
        Self {
            provider,
            transport,
            rate_limiter,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    /// One GET, without retry.
    async fn get_once(&self, url: &str, headers: &HttpHeaders) -> Result<Value> {
        self.wait_for_rate_limit().await;

        let mut request = HttpRequest::get(url).with_header("Accept", "application/json");
        request.headers.extend(headers.iter().cloned());

        let response = self.transport.send(request).await?;

        if response.status == 429 {
            let retry_after = response
                .header("retry-after")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !response.is_success() {
            let mut message = response.text();
            if message.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| message.is_char_boundary(*i))
                    .unwrap_or(0);
                message.truncate(cut);
            }
            return Err(ProviderError::api(response.status, message));
        }

        Ok(response.json()?)
    }

    /// GET a JSON document, backing off on 429.
    pub async fn get_json(
        &self,
        url: &str,
        headers: &HttpHeaders,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Value> {
        with_retry(
            || self.get_once(url, headers),
            &self.retry,
            self.provider,
            on_progress,
        )
        .await
    }

    /// Follow a cursor until the provider stops returning one.
    ///
    /// `cursor_of` reads the next cursor out of a page. A cursor is appended
    /// to `url` as the `cursor` query parameter. When `bearer` is set it is
    /// sent as `Authorization: Bearer ..`.
    ///
    /// A failed request ends the loop; the pages fetched before it are
    /// returned alongside the error.
    pub async fn fetch_pages<F>(
        &self,
        url: &str,
        bearer: Option<&str>,
        cursor_of: F,
        headers: &HttpHeaders,
        on_progress: Option<&ProgressCallback>,
    ) -> FetchedPages
    where
        F: Fn(&Value) -> Option<String>,
    {
        let mut headers = headers.clone();
        if let Some(token) = bearer.filter(|t| !t.trim().is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let mut out = FetchedPages::default();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut page_number = 0u32;

        loop {
            let page_url = match cursor.as_deref() {
                Some(c) => with_query_param(url, "cursor", c),
                None => url.to_string(),
            };

            let page = match self.get_json(&page_url, &headers, on_progress).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        provider = %self.provider,
                        url = %page_url,
                        error = %e,
                        "Page fetch failed, stopping pagination"
                    );
                    out.error = Some(e);
                    break;
                }
            };

            page_number += 1;
            cursor = cursor_of(&page);
            out.pages.push(page);

            emit(
                on_progress,
                SyncProgress::FetchedPage {
                    provider: self.provider,
                    page: page_number,
                    total_so_far: out.pages.len(),
                },
            );

            match cursor.as_deref() {
                None | Some("") => break,
                Some(c) if !seen_cursors.insert(c.to_string()) => {
                    tracing::warn!(provider = %self.provider, cursor = c, "Cursor repeated, stopping pagination");
                    break;
                }
                Some(_) if page_number >= MAX_PAGES => {
                    tracing::warn!(provider = %self.provider, "Page limit reached, stopping pagination");
                    break;
                }
                Some(_) => {}
            }
        }

        out
    }

    /// Fetch one document per `(team, season)` combination.
    ///
    /// A failure for one combination is recorded and the fan-out moves on to
    /// the next.
    pub async fn fetch_for_teams_and_seasons<F>(
        &self,
        team_ids: &[i64],
        seasons: &[i32],
        endpoint: F,
        headers: &HttpHeaders,
        on_progress: Option<&ProgressCallback>,
    ) -> TeamSeasonPages
    where
        F: Fn(i64, i32) -> String,
    {
        let mut out = TeamSeasonPages::default();

        for &team_id in team_ids {
            for &season in seasons {
                let url = endpoint(team_id, season);
                match self.get_json(&url, headers, on_progress).await {
                    Ok(body) => {
                        out.pages.push(TeamSeasonPage {
                            team_id,
                            season,
                            body,
                        });
                        emit(
                            on_progress,
                            SyncProgress::FetchedPage {
                                provider: self.provider,
                                page: out.pages.len() as u32,
                                total_so_far: out.pages.len(),
                            },
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            provider = %self.provider,
                            team_id,
                            season,
                            error = %e,
                            "Team roster fetch failed"
                        );
                        out.errors.push(e);
                    }
                }
            }
        }

        out
    }
}

/// Append `name=value` to a URL that may already carry a query string.
fn with_query_param(url: &str, name: &str, value: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{name}={value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockTransport, header_get};
    use serde_json::json;

    fn gateway(transport: &MockTransport) -> ProviderGateway {
        ProviderGateway::new(Provider::BallDontLie, Arc::new(transport.clone()), None)
            .with_retry_config(
                RetryConfig::new(Duration::from_millis(1), Duration::from_millis(5), 3)
                    .with_jitter(false),
            )
    }

    fn next_cursor(page: &Value) -> Option<String> {
        page.get("meta")?
            .get("next_cursor")
            .filter(|c| !c.is_null())
            .map(|c| match c {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    #[test]
    fn test_with_query_param() {
        assert_eq!(
            with_query_param("https://x/players?per_page=50", "cursor", "9"),
            "https://x/players?per_page=50&cursor=9"
        );
        assert_eq!(with_query_param("https://x/teams", "cursor", "9"), "https://x/teams?cursor=9");
    }

    #[tokio::test]
    async fn fetch_pages_follows_cursor_and_sends_bearer() {
        let transport = MockTransport::new();
        let base = "https://api.test/players?per_page=2";
        transport.push_json(base, json!({ "data": [1, 2], "meta": { "next_cursor": 25 } }));
        transport.push_json(
            format!("{base}&cursor=25"),
            json!({ "data": [3], "meta": { "next_cursor": null } }),
        );

        let fetched = gateway(&transport)
            .fetch_pages(base, Some("secret"), next_cursor, &Vec::new(), None)
            .await;

        assert!(fetched.error.is_none());
        assert_eq!(fetched.pages.len(), 2);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            header_get(&requests[0].headers, "authorization"),
            Some("Bearer secret")
        );
    }

    #[tokio::test]
    async fn fetch_pages_keeps_pages_before_a_failure() {
        let transport = MockTransport::new();
        let base = "https://api.test/players";
        transport.push_json(base, json!({ "data": [1], "meta": { "next_cursor": "b" } }));
        transport.push_response(
            format!("{base}?cursor=b"),
            HttpResponse {
                status: 500,
                headers: Vec::new(),
                body: b"oops".to_vec(),
            },
        );

        let fetched = gateway(&transport)
            .fetch_pages(base, None, next_cursor, &Vec::new(), None)
            .await;

        assert_eq!(fetched.pages.len(), 1);
        assert!(matches!(
            fetched.error,
            Some(ProviderError::Api { status: 500, .. })
        ));
        assert!(header_get(&transport.requests()[0].headers, "authorization").is_none());
    }

    #[tokio::test]
    async fn fetch_pages_stops_on_repeated_cursor() {
        let transport = MockTransport::new();
        let base = "https://api.test/players";
        transport.push_json(base, json!({ "meta": { "next_cursor": "same" } }));
        transport.push_json(
            format!("{base}?cursor=same"),
            json!({ "meta": { "next_cursor": "same" } }),
        );

        let fetched = gateway(&transport)
            .fetch_pages(base, None, next_cursor, &Vec::new(), None)
            .await;

        assert_eq!(fetched.pages.len(), 2);
        assert!(fetched.error.is_none());
    }

    #[tokio::test]
    async fn get_json_retries_after_429() {
        let transport = MockTransport::new();
        let url = "https://api.test/teams";
        transport.push_response(
            url,
            HttpResponse {
                status: 429,
                headers: vec![("Retry-After".to_string(), "1".to_string())],
                body: Vec::new(),
            },
        );
        transport.push_json(url, json!({ "data": [] }));

        let page = gateway(&transport)
            .get_json(url, &Vec::new(), None)
            .await
            .expect("second attempt succeeds");

        assert_eq!(page, json!({ "data": [] }));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn get_json_reports_bad_json_as_parse_error() {
        let transport = MockTransport::new();
        let url = "https://api.test/teams";
        transport.push_response(
            url,
            HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"<html>".to_vec(),
            },
        );

        let err = gateway(&transport)
            .get_json(url, &Vec::new(), None)
            .await
            .expect_err("html is not json");
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    #[tokio::test]
    async fn fan_out_continues_past_failures() {
        let transport = MockTransport::new();
        let endpoint = |team: i64, season: i32| format!("https://api.test/players?team={team}&season={season}");
        transport.push_json(endpoint(1, 2023), json!({ "response": [] }));
        transport.push_failure(endpoint(1, 2024), "connection reset");
        transport.push_json(endpoint(2, 2023), json!({ "response": [] }));
        transport.push_json(endpoint(2, 2024), json!({ "response": [] }));

        let headers = vec![("x-rapidapi-key".to_string(), "k".to_string())];
        let fetched = gateway(&transport)
            .fetch_for_teams_and_seasons(&[1, 2], &[2023, 2024], endpoint, &headers, None)
            .await;

        assert_eq!(fetched.pages.len(), 3);
        assert_eq!(fetched.errors.len(), 1);
        assert!(
            transport
                .requests()
                .iter()
                .all(|r| header_get(&r.headers, "x-rapidapi-key") == Some("k"))
        );
        assert_eq!(
            (fetched.pages[1].team_id, fetched.pages[1].season),
            (2, 2023)
        );
    }
}
