//! Listing pagination over the segmentation search.

use std::sync::Arc;

use abdb_core::{EntityReference, HarvestConfig};
use futures::stream::{self, Stream, StreamExt};

use crate::error::ScraperError;
use crate::extract::PageFieldExtractor;
use crate::fetch::Fetcher;

/// Walks listing pages from page 1 upward and yields the references found.
///
/// Enumeration ends at the first page with no references, at the first fetch
/// failure, or after `page_limit` pages, whichever comes first. None of these
/// is reported as an error. Each call to [`ListingEnumerator::enumerate`]
/// starts again at page 1.
#[derive(Clone)]
pub struct ListingEnumerator {
    fetcher: Fetcher,
    extractor: Arc<dyn PageFieldExtractor>,
    config: HarvestConfig,
}

impl ListingEnumerator {
    #[must_use]
    pub fn new(
        fetcher: Fetcher,
        extractor: Arc<dyn PageFieldExtractor>,
        config: HarvestConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    /// Query parameters for listing page `page` (1-based).
    ///
    /// The page number is omitted on the first page.
    #[must_use]
    pub fn page_params(&self, page: u32) -> Vec<(&'static str, String)> {
        let config = &self.config;
        let mut params = vec![
            ("location", config.location.clone()),
            ("sort", config.sort_by.clone()),
            ("revenueFrom", config.revenue_range.0.to_string()),
            ("revenueTo", config.revenue_range.1.to_string()),
            ("profitFrom", config.profit_range.0.to_string()),
            ("profitTo", config.profit_range.1.to_string()),
        ];
        if page > 1 {
            params.push(("page", page.to_string()));
        }
        params
    }

    /// Fetches one listing page and extracts its references.
    ///
    /// # Errors
    ///
    /// Returns any [`ScraperError`] produced by the fetcher.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<EntityReference>, ScraperError> {
        let params = self.page_params(page);
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let body = self
            .fetcher
            .fetch_with_query(&self.config.search_url(), &params, &[])
            .await?;
        Ok(self.extractor.extract_references(&body))
    }

    /// Lazily yields references in pagination order.
    pub fn enumerate(&self) -> impl Stream<Item = EntityReference> + '_ {
        let page_limit = self.config.page_limit;
        stream::unfold(1u32, move |page| async move {
            if page > page_limit {
                tracing::info!(page_limit, "listing page limit reached");
                return None;
            }
            match self.fetch_page(page).await {
                Ok(refs) if refs.is_empty() => {
                    tracing::info!(page, "listing page has no results; enumeration complete");
                    None
                }
                Ok(refs) => {
                    tracing::debug!(page, count = refs.len(), "listing page fetched");
                    Some((stream::iter(refs), page + 1))
                }
                Err(e) => {
                    tracing::warn!(
                        page,
                        error = %e,
                        "listing page fetch failed; stopping enumeration"
                    );
                    None
                }
            }
        })
        .flatten()
    }

    /// Drains [`ListingEnumerator::enumerate`] into a vector.
    pub async fn collect_all(&self) -> Vec<EntityReference> {
        self.enumerate().collect().await
    }
}

impl std::fmt::Debug for ListingEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingEnumerator")
            .field("fetcher", &self.fetcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::extract::AllabolagExtractor;

    fn enumerator() -> ListingEnumerator {
        let fetcher = Fetcher::new(5, "test-agent", Duration::ZERO, 0, 0).unwrap();
        ListingEnumerator::new(
            fetcher,
            Arc::new(AllabolagExtractor::new("https://www.allabolag.se")),
            HarvestConfig::default(),
        )
    }

    #[test]
    fn first_page_omits_page_param() {
        let params = enumerator().page_params(1);
        assert!(params.iter().all(|(k, _)| *k != "page"));
        assert_eq!(params[0], ("location", "Örebro".to_owned()));
        assert_eq!(params[2], ("revenueFrom", "2000".to_owned()));
        assert_eq!(params[4], ("profitFrom", "-12153147".to_owned()));
    }

    #[test]
    fn later_pages_carry_page_param() {
        let params = enumerator().page_params(3);
        assert_eq!(params.last(), Some(&("page", "3".to_owned())));
    }
}
