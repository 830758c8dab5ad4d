//! Concrete [`SearchBackend`] implementations.

use std::sync::LazyLock;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;

use super::SearchBackend;
use crate::error::ScraperError;
use crate::fetch::Fetcher;

const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Google returns at most ten results per call.
const MAX_RESULTS: u8 = 10;

static DDG_RESULT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("valid css selector"));

fn parse_json<T: for<'de> Deserialize<'de>>(body: &str, context: &str) -> Result<T, ScraperError> {
    serde_json::from_str(body).map_err(|source| ScraperError::Deserialize {
        context: context.to_owned(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Google Custom Search JSON API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    link: Option<String>,
}

/// Google Custom Search with a Swedish language and country bias.
#[derive(Debug, Clone)]
pub struct GoogleCseSearch {
    fetcher: Fetcher,
    api_key: String,
    cx: String,
    num_results: u8,
    endpoint: String,
}

impl GoogleCseSearch {
    #[must_use]
    pub fn new(fetcher: Fetcher, api_key: impl Into<String>, cx: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            cx: cx.into(),
            num_results: MAX_RESULTS,
            endpoint: GOOGLE_CSE_URL.to_owned(),
        }
    }

    /// Results requested per query, clamped to `1..=10`.
    #[must_use]
    pub fn with_num_results(mut self, num_results: u8) -> Self {
        self.num_results = num_results.clamp(1, MAX_RESULTS);
        self
    }

    /// Overrides the API endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchBackend for GoogleCseSearch {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ScraperError> {
        let num = self.num_results.to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("cx", self.cx.as_str()),
            ("q", query),
            ("num", num.as_str()),
            ("hl", "sv"),
            ("lr", "lang_sv"),
            ("gl", "se"),
            ("cr", "countrySE"),
        ];
        let body = self
            .fetcher
            .fetch_with_query(&self.endpoint, &params, &[])
            .await?;
        let response: GoogleResponse = parse_json(&body, "google custom search response")?;
        Ok(response.items.into_iter().filter_map(|item| item.link).collect())
    }
}

// ---------------------------------------------------------------------------
// Brave Search API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    url: Option<String>,
}

/// Brave web search restricted to Swedish results.
#[derive(Debug, Clone)]
pub struct BraveSearch {
    fetcher: Fetcher,
    api_key: String,
    endpoint: String,
}

impl BraveSearch {
    #[must_use]
    pub fn new(fetcher: Fetcher, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            endpoint: BRAVE_SEARCH_URL.to_owned(),
        }
    }

    /// Overrides the API endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchBackend for BraveSearch {
    fn name(&self) -> &'static str {
        "brave"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ScraperError> {
        let params = [
            ("q", query),
            ("country", "SE"),
            ("search_lang", "sv"),
            ("ui_lang", "sv-SE"),
            ("count", "10"),
        ];
        let headers = [
            ("Accept", "application/json"),
            ("X-Subscription-Token", self.api_key.as_str()),
        ];
        let body = self
            .fetcher
            .fetch_with_query(&self.endpoint, &params, &headers)
            .await?;
        let response: BraveResponse = parse_json(&body, "brave search response")?;
        Ok(response
            .web
            .map(|web| web.results.into_iter().filter_map(|r| r.url).collect())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// DuckDuckGo HTML endpoint
// ---------------------------------------------------------------------------

/// DuckDuckGo's HTML results page, restricted to `.se` sites. Needs no key.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    fetcher: Fetcher,
    endpoint: String,
}

impl DuckDuckGoSearch {
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            endpoint: DUCKDUCKGO_HTML_URL.to_owned(),
        }
    }

    /// Overrides the results endpoint (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ScraperError> {
        let query = format!("{query} site:.se");
        let body = self
            .fetcher
            .fetch_with_query(&self.endpoint, &[("q", query.as_str())], &[])
            .await?;
        Ok(result_links(&body))
    }
}

/// Absolute result hrefs from a DuckDuckGo HTML results page.
fn result_links(page: &str) -> Vec<String> {
    Html::parse_document(page)
        .select(&DDG_RESULT_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("http"))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddg_links_skip_relative_redirects() {
        let page = r#"
            <a class="result__a" href="//duckduckgo.com/l/?uddg=x">redirect</a>
            <a class="result__a" href="https://www.acme.se/">Acme</a>
            <a class="other" href="https://ignored.se/">ignored</a>
        "#;
        assert_eq!(result_links(page), vec!["https://www.acme.se/"]);
    }

    #[test]
    fn google_response_without_items_is_empty() {
        let response: GoogleResponse = parse_json("{}", "test").unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn brave_response_without_web_section_is_empty() {
        let response: BraveResponse = parse_json(r#"{"query":{}}"#, "test").unwrap();
        assert!(response.web.is_none());
    }

    #[test]
    fn malformed_json_is_a_deserialize_error() {
        let err = parse_json::<GoogleResponse>("<html>", "google").unwrap_err();
        assert!(matches!(err, ScraperError::Deserialize { .. }));
    }
}
