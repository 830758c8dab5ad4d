//! Contact discovery: find a company's own website through a search
//! backend, then probe likely sub-pages of it for email addresses.

mod probe;
mod search;

pub use probe::{extract_emails, EmailProbe, ACCEPTED_EMAIL_TLDS, PROBE_PATHS};
pub use search::{BraveSearch, DuckDuckGoSearch, GoogleCseSearch};

use std::sync::Arc;

use abdb_core::EntityRecord;
use async_trait::async_trait;

use crate::error::ScraperError;

/// Hosts that list companies without being the company's own site:
/// directories, maps, social networks, review and booking sites, job boards
/// and news outlets.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "allabolag.se",
    "hitta.se",
    "bolagsfakta.se",
    "ratsit.se",
    "merinfo.se",
    "eniro.se",
    "proff.se",
    "proff.no",
    "uc.se",
    "finder.se",
    "partna.se",
    "kreditrapporten.se",
    "orebro.se",
    "verksamt.se",
    "bolagsverket.se",
    "google.com/maps",
    "google.se/maps",
    "bing.com/maps",
    "apple.com/maps",
    "facebook.com",
    "facebook.se",
    "instagram.com",
    "linkedin.com",
    "x.com",
    "twitter.com",
    "tiktok.com",
    "youtube.com",
    "reco.se",
    "trustpilot.com",
    "trustpilot.se",
    "yelp.com",
    "bokadirekt.se",
    "fresha.com",
    "booksy.com",
    "blocket.se",
    "tripadvisor.se",
    "thefork.se",
    "wolt.com",
    "foodora.se",
    "arbetsformedlingen.se",
    "indeed.com",
    "indeed.se",
    "monster.se",
    "careerjet.se",
    "vakanser.se",
    "na.se",
    "svt.se",
    "aftonbladet.se",
    "expressen.se",
    "orebrohockey.se",
    "konkurslistan.se",
    "newsworthy.se",
    "ledigalagenheter.org",
];

/// A web search provider that returns ranked candidate URLs for a query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short provider name for logs and errors.
    fn name(&self) -> &'static str;

    /// Candidate URLs for `query`, best match first.
    ///
    /// # Errors
    ///
    /// Returns a [`ScraperError`] when the provider cannot be queried or its
    /// response cannot be read.
    async fn search(&self, query: &str) -> Result<Vec<String>, ScraperError>;
}

/// Picks the first search result that is not a known third-party listing.
#[derive(Clone)]
pub struct WebsiteFinder {
    backend: Arc<dyn SearchBackend>,
    exclusions: Vec<String>,
    query_suffix: String,
}

impl WebsiteFinder {
    /// Finder over `backend` with [`DEFAULT_EXCLUSIONS`] and no query suffix.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| (*s).to_owned()).collect(),
            query_suffix: String::new(),
        }
    }

    #[must_use]
    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = exclusions.into_iter().map(Into::into).collect();
        self
    }

    /// Text appended to every company name before searching.
    #[must_use]
    pub fn with_query_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.query_suffix = suffix.into();
        self
    }

    /// `true` if `url` contains any excluded host fragment.
    #[must_use]
    pub fn is_excluded(&self, url: &str) -> bool {
        self.exclusions.iter().any(|excl| url.contains(excl.as_str()))
    }

    /// Searches for `entity_name` and returns the first acceptable result.
    ///
    /// Search failures are logged and reported as "not found".
    pub async fn discover_website(&self, entity_name: &str) -> Option<String> {
        let query = if self.query_suffix.trim().is_empty() {
            entity_name.trim().to_owned()
        } else {
            format!("{} {}", entity_name.trim(), self.query_suffix.trim())
        };

        let candidates = match self.backend.search(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    provider = self.backend.name(),
                    query = %query,
                    error = %e,
                    "website search failed"
                );
                return None;
            }
        };

        candidates.into_iter().find(|url| !self.is_excluded(url))
    }
}

impl std::fmt::Debug for WebsiteFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebsiteFinder")
            .field("backend", &self.backend.name())
            .field("exclusions", &self.exclusions.len())
            .field("query_suffix", &self.query_suffix)
            .finish()
    }
}

/// What one contact-discovery pass changed on a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactOutcome {
    pub website_found: bool,
    pub emails_added: usize,
}

/// Website search plus email probing for records that lack contact details.
#[derive(Debug, Clone)]
pub struct ContactDiscovery {
    finder: WebsiteFinder,
    probe: EmailProbe,
}

impl ContactDiscovery {
    #[must_use]
    pub fn new(finder: WebsiteFinder, probe: EmailProbe) -> Self {
        Self { finder, probe }
    }

    /// Fills a blank website from search, then appends probed emails.
    ///
    /// Appended emails are not deduplicated against existing ones; that is
    /// left to the merge step.
    pub async fn supplement(&self, record: &mut EntityRecord) -> ContactOutcome {
        let mut outcome = ContactOutcome::default();

        if record.website_value().is_none() {
            record.website = self.finder.discover_website(&record.name).await;
            outcome.website_found = record.website.is_some();
        }

        let Some(website) = record.website_value().map(str::to_owned) else {
            return outcome;
        };

        if let Some(emails) = self.probe.discover_emails(&website).await {
            outcome.emails_added = emails.len();
            record.emails.extend(emails);
        }
        outcome
    }
}
