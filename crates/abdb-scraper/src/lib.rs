//! Fetching and page extraction for the company directory harvester.
//!
//! Every outbound request goes through one [`Fetcher`], whose shared
//! [`Throttle`] spaces requests across all stages and workers.

pub mod contacts;
pub mod detail;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod rate_limit;

pub use contacts::{
    extract_emails, BraveSearch, ContactDiscovery, ContactOutcome, DuckDuckGoSearch, EmailProbe,
    GoogleCseSearch, SearchBackend, WebsiteFinder,
};
pub use detail::DetailExtractor;
pub use error::ScraperError;
pub use extract::{AllabolagExtractor, FieldPatch, FieldRule, PageFieldExtractor};
pub use fetch::Fetcher;
pub use listing::ListingEnumerator;
pub use rate_limit::Throttle;
