//! Profile page fetch and field population.

use std::sync::{Arc, LazyLock};

use abdb_core::{EntityRecord, EntityReference};
use regex::Regex;

use crate::extract::{FieldRule, PageFieldExtractor};
use crate::fetch::Fetcher;

/// Ten-digit organisation number at the end of a profile URL.
static LOCATOR_ORG_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d{10})$").expect("valid locator org number regex"));

/// Fills an [`EntityRecord`] from a reference's profile page.
#[derive(Clone)]
pub struct DetailExtractor {
    fetcher: Fetcher,
    extractor: Arc<dyn PageFieldExtractor>,
}

impl DetailExtractor {
    #[must_use]
    pub fn new(fetcher: Fetcher, extractor: Arc<dyn PageFieldExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Fetches the profile page and applies every [`FieldRule`] in order.
    ///
    /// Never fails: when the page cannot be fetched the reference comes back
    /// as a record with every detail field absent.
    pub async fn extract_details(&self, reference: &EntityReference) -> EntityRecord {
        let mut record = EntityRecord::from_reference(reference);

        let page = match self.fetcher.fetch(&reference.profile_url, &[]).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    name = %reference.name,
                    url = %reference.profile_url,
                    error = %e,
                    "profile fetch failed; keeping bare record"
                );
                return record;
            }
        };

        populate(&mut record, &page, self.extractor.as_ref());
        record
    }
}

/// Applies the locator rule and then every page rule, later values winning.
pub(crate) fn populate(record: &mut EntityRecord, page: &str, extractor: &dyn PageFieldExtractor) {
    record.org_number = org_number_from_locator(&record.profile_url);
    for rule in FieldRule::ORDER {
        extractor.extract_fields(page, rule).apply_to(record);
    }
}

/// Trailing ten-digit run of a profile URL, if any.
#[must_use]
pub fn org_number_from_locator(profile_url: &str) -> Option<String> {
    LOCATOR_ORG_NUMBER_RE
        .captures(profile_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

impl std::fmt::Debug for DetailExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailExtractor")
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FieldPatch;

    /// Extractor whose rules each set the same fields, to observe ordering.
    struct Scripted;

    impl PageFieldExtractor for Scripted {
        fn extract_references(&self, _page: &str) -> Vec<EntityReference> {
            Vec::new()
        }

        fn extract_fields(&self, _page: &str, rule: FieldRule) -> FieldPatch {
            match rule {
                FieldRule::OfficialInfo => FieldPatch {
                    org_number: Some("556123-4567".to_owned()),
                    ..FieldPatch::default()
                },
                FieldRule::ContactLabels => FieldPatch {
                    website: Some("acme.se".to_owned()),
                    emails: vec!["info@acme.se".to_owned()],
                    ..FieldPatch::default()
                },
                FieldRule::ContactInfo => FieldPatch {
                    website: Some("https://www.acme.se".to_owned()),
                    emails: vec!["info@acme.se".to_owned()],
                    ..FieldPatch::default()
                },
                _ => FieldPatch::default(),
            }
        }
    }

    struct Blank;

    impl PageFieldExtractor for Blank {
        fn extract_references(&self, _page: &str) -> Vec<EntityReference> {
            Vec::new()
        }

        fn extract_fields(&self, _page: &str, _rule: FieldRule) -> FieldPatch {
            FieldPatch::default()
        }
    }

    fn record() -> EntityRecord {
        EntityRecord::from_reference(&EntityReference::new(
            "Acme AB",
            "https://www.allabolag.se/foretag/acme-ab/orebro/-/5561234567",
        ))
    }

    #[test]
    fn locator_supplies_org_number_when_page_has_none() {
        let mut record = record();
        populate(&mut record, "", &Blank);
        assert_eq!(record.org_number.as_deref(), Some("5561234567"));
    }

    #[test]
    fn labeled_org_number_overrides_locator() {
        let mut record = record();
        populate(&mut record, "", &Scripted);
        assert_eq!(record.org_number.as_deref(), Some("556123-4567"));
    }

    #[test]
    fn later_contact_rule_wins_website_and_emails_accumulate() {
        let mut record = record();
        populate(&mut record, "", &Scripted);
        assert_eq!(record.website.as_deref(), Some("https://www.acme.se"));
        assert_eq!(record.emails, vec!["info@acme.se", "info@acme.se"]);
    }

    #[test]
    fn locator_without_trailing_digits_has_no_org_number() {
        assert_eq!(
            org_number_from_locator("https://www.allabolag.se/foretag/acme-ab"),
            None
        );
        assert_eq!(
            org_number_from_locator("https://www.allabolag.se/5561234567/bokslut"),
            None
        );
    }
}
