//! Rate-limited HTTP fetcher shared by every outbound call site.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::{retry_with_backoff, Throttle};

/// HTTP GET client with a process-wide request throttle.
///
/// Cloning is cheap and every clone shares the same [`Throttle`], so the
/// minimum spacing holds across all callers (listing pages, profile pages,
/// search backends, email probes) combined.
///
/// Non-2xx responses become [`ScraperError::NonOkStatus`] (or
/// [`ScraperError::RateLimited`] for 429); transport failures become
/// [`ScraperError::Http`]. Whether a failure is fatal is the caller's call.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    throttle: Arc<Throttle>,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl Fetcher {
    /// Creates a `Fetcher` with configured timeout, `User-Agent`, request
    /// spacing and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        min_spacing: Duration,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            throttle: Arc::new(Throttle::new(min_spacing)),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a `Fetcher` from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &abdb_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.harvest.request_delay,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Fetches `url` and returns the response body of a 2xx response.
    ///
    /// Each attempt (including retries) waits for its own throttle slot.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::NonOkStatus`] for non-2xx statuses other than 429.
    /// - [`ScraperError::RateLimited`] for 429 after retries are exhausted.
    /// - [`ScraperError::Http`] on network failure after retries are exhausted.
    pub async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            self.throttle.until_ready().await;

            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited {
                    domain: extract_domain(url),
                    retry_after_secs,
                });
            }

            if !status.is_success() {
                return Err(ScraperError::NonOkStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            Ok(response.text().await?)
        })
        .await
    }

    /// Fetches `base` with URL-encoded query parameters appended.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] if `base` does not parse, and
    /// otherwise the same errors as [`Fetcher::fetch`].
    pub async fn fetch_with_query(
        &self,
        base: &str,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String, ScraperError> {
        let url = build_url(base, params)?;
        self.fetch(&url, headers).await
    }
}

/// Appends URL-encoded query parameters to `base`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `base` is not an absolute URL.
pub fn build_url(base: &str, params: &[(&str, &str)]) -> Result<String, ScraperError> {
    let url = if params.is_empty() {
        reqwest::Url::parse(base)
    } else {
        reqwest::Url::parse_with_params(base, params)
    }
    .map_err(|e| ScraperError::InvalidUrl {
        url: base.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(url.to_string())
}

/// Hostname of `url` for log and error context; falls back to the input.
pub(crate) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_encodes_params() {
        let url = build_url(
            "https://www.allabolag.se/segmentering",
            &[("location", "Örebro"), ("sort", "revenueDesc")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://www.allabolag.se/segmentering?location=%C3%96rebro&sort=revenueDesc"
        );
    }

    #[test]
    fn build_url_without_params_is_unchanged() {
        assert_eq!(
            build_url("https://acme.se/kontakt", &[]).unwrap(),
            "https://acme.se/kontakt"
        );
    }

    #[test]
    fn build_url_rejects_relative_base() {
        let err = build_url("segmentering", &[("page", "2")]).unwrap_err();
        assert!(
            matches!(err, ScraperError::InvalidUrl { .. }),
            "expected InvalidUrl, got: {err:?}"
        );
    }

    #[test]
    fn extract_domain_strips_scheme_and_path() {
        assert_eq!(extract_domain("https://acme.se/om-oss"), "acme.se");
        assert_eq!(extract_domain("acme.se"), "acme.se");
    }
}
