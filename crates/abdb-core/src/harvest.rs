use std::time::Duration;

/// Run-level filter configuration for the listing enumerator.
///
/// Built once at startup and passed by reference into every stage; it is
/// also the source of the tag that names a run's stage files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Directory origin, e.g. `"https://www.allabolag.se"`.
    pub base_url: String,
    pub location: String,
    pub sort_by: String,
    /// Highest listing page that will be requested.
    pub page_limit: u32,
    /// Inclusive revenue bounds (thousand SEK).
    pub revenue_range: (i64, i64),
    /// Inclusive profit bounds (thousand SEK).
    pub profit_range: (i64, i64),
    /// Minimum spacing between any two outbound requests.
    pub request_delay: Duration,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.allabolag.se".to_owned(),
            location: "Örebro".to_owned(),
            sort_by: "revenueDesc".to_owned(),
            page_limit: 2000,
            revenue_range: (2000, 2_000_000),
            profit_range: (-12_153_147, 85_733_000),
            request_delay: Duration::from_millis(500),
        }
    }
}

impl HarvestConfig {
    /// Segmentation search endpoint the listing pages are served from.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}/segmentering", self.base_url.trim_end_matches('/'))
    }

    /// Tag identifying this filter combination in stage file names.
    #[must_use]
    pub fn filename_tag(&self) -> String {
        format!(
            "rev-{}-{}_nump-{}_sort-{}",
            self.revenue_range.0, self.revenue_range.1, self.page_limit, self.sort_by
        )
    }
}
