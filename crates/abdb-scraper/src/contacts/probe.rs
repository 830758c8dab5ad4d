//! Email harvesting from a company's own website.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::fetch::Fetcher;

/// Sub-paths probed in order, relative to the site root. The empty path is
/// the home page.
pub const PROBE_PATHS: &[&str] = &[
    "",
    "kontakt",
    "kontakta",
    "kontakta-oss",
    "om-oss",
    "about",
    "about-us",
    "contact",
    "contact-info",
    "info",
    "teamet",
    "vårt-team",
    "kontakter",
    "marketing",
    "team",
];

/// Address suffixes kept by the probe.
pub const ACCEPTED_EMAIL_TLDS: &[&str] = &[".se", ".com", ".net", ".org"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").expect("valid email regex")
});

/// Lowercased email addresses in `text` whose suffix is in `accepted_tlds`.
///
/// Order of first appearance is kept; repeats are dropped.
#[must_use]
pub fn extract_emails<S: AsRef<str>>(text: &str, accepted_tlds: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|email| {
            accepted_tlds
                .iter()
                .any(|tld| email.ends_with(tld.as_ref()))
        })
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

/// Visible text of an HTML page, text nodes separated by spaces.
fn page_text(page: &str) -> String {
    let document = Html::parse_document(page);
    let parts: Vec<&str> = document.root_element().text().collect();
    parts.join(" ")
}

/// Walks [`PROBE_PATHS`] on a site and gathers email addresses.
#[derive(Debug, Clone)]
pub struct EmailProbe {
    fetcher: Fetcher,
    paths: Vec<String>,
    accepted_tlds: Vec<String>,
}

impl EmailProbe {
    #[must_use]
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            paths: PROBE_PATHS.iter().map(|p| (*p).to_owned()).collect(),
            accepted_tlds: ACCEPTED_EMAIL_TLDS.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    #[must_use]
    pub fn with_accepted_tlds<I, S>(mut self, tlds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_tlds = tlds.into_iter().map(Into::into).collect();
        self
    }

    /// Probes `{base_url}/{path}` for each path in order.
    ///
    /// Returns the case-insensitive union of addresses found. The first
    /// non-2xx response ends the probe and returns what was gathered so far.
    /// A transport failure returns `None`: the site could not be checked,
    /// which is not the same as finding nothing.
    pub async fn discover_emails(&self, base_url: &str) -> Option<Vec<String>> {
        let base = base_url.trim().trim_end_matches('/');
        let mut found: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for path in &self.paths {
            let url = format!("{base}/{path}");
            match self.fetcher.fetch(&url, &[]).await {
                Ok(page) => {
                    let text = page_text(&page);
                    for email in extract_emails(&text, self.accepted_tlds.as_slice()) {
                        if seen.insert(email.clone()) {
                            found.push(email);
                        }
                    }
                }
                Err(e) if e.status().is_some() => {
                    tracing::debug!(url = %url, error = %e, "probe path unavailable; stopping");
                    return Some(found);
                }
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "probe inconclusive");
                    return None;
                }
            }
        }
        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_accepted_suffixes() {
        let text = "Mail sales@firma.se or boss@firma.de, support@Firma.COM";
        assert_eq!(
            extract_emails(text, ACCEPTED_EMAIL_TLDS),
            vec!["sales@firma.se", "support@firma.com"]
        );
    }

    #[test]
    fn repeats_are_dropped_case_insensitively() {
        let text = "info@acme.se INFO@ACME.SE info@acme.se";
        assert_eq!(extract_emails(text, ACCEPTED_EMAIL_TLDS), vec!["info@acme.se"]);
    }

    #[test]
    fn no_addresses_yields_empty() {
        assert!(extract_emails("Ring oss på 019-12 34 56", ACCEPTED_EMAIL_TLDS).is_empty());
    }

    #[test]
    fn page_text_separates_nodes() {
        let text = page_text("<p>info@acme.se</p><p>Telefon</p>");
        assert_eq!(extract_emails(&text, ACCEPTED_EMAIL_TLDS), vec!["info@acme.se"]);
    }

    #[test]
    fn home_page_is_probed_first() {
        assert_eq!(PROBE_PATHS[0], "");
        assert_eq!(PROBE_PATHS[1], "kontakt");
    }
}
