use std::path::PathBuf;

use crate::harvest::HarvestConfig;

/// Backend used to discover a company's own website.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchProvider {
    /// Google Custom Search JSON API (needs an API key and engine id).
    Google,
    /// Brave Search JSON API (needs an API key).
    Brave,
    /// DuckDuckGo HTML results page (no credentials).
    DuckDuckGo,
}

impl std::fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchProvider::Google => write!(f, "google"),
            SearchProvider::Brave => write!(f, "brave"),
            SearchProvider::DuckDuckGo => write!(f, "duckduckgo"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub harvest: HarvestConfig,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub detail_concurrency: usize,
    pub search_provider: SearchProvider,
    pub search_api_key: Option<String>,
    pub search_cx: Option<String>,
    pub search_query_suffix: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("harvest", &self.harvest)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("detail_concurrency", &self.detail_concurrency)
            .field("search_provider", &self.search_provider)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("search_cx", &self.search_cx)
            .field("search_query_suffix", &self.search_query_suffix)
            .finish()
    }
}
