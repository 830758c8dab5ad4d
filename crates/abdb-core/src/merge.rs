//! Reconciliation of two partial record sets for the same companies.
//!
//! Only `website` and `emails` are ever combined. Records are matched on a
//! normalized key; records without a key pass through with their own emails
//! deduplicated.

use std::collections::{HashMap, HashSet};

use crate::keys::{name_key, registration_key};
use crate::records::EntityRecord;

/// Which normalized key links records across the two sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeKey {
    /// Digits-only organisation number.
    #[default]
    RegistrationNumber,
    /// Lowercased, trimmed company name.
    Name,
}

impl MergeKey {
    fn of(self, record: &EntityRecord) -> String {
        match self {
            MergeKey::RegistrationNumber => registration_key(record.org_number.as_deref()),
            MergeKey::Name => name_key(&record.name),
        }
    }
}

#[derive(Debug, Default)]
struct Contacts {
    website: Option<String>,
    emails: Vec<String>,
}

/// Deduplicates emails case-insensitively, keeping the first spelling seen.
///
/// Surrounding whitespace and quote characters are stripped before
/// comparison; entries that are empty after stripping are dropped.
#[must_use]
pub fn dedupe_emails<I, S>(emails: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for email in emails {
        let cleaned = clean_email(email.as_ref());
        if cleaned.is_empty() {
            continue;
        }
        if seen.insert(cleaned.to_lowercase()) {
            out.push(cleaned.to_owned());
        }
    }
    out
}

fn clean_email(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim_matches('\'').trim()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
}

/// Folds contact data from `other` into a copy of `main`.
///
/// Duplicate keys inside `other` are folded first (first non-blank website
/// wins, emails accumulate). For each record of `main` with a matching key,
/// a blank website is filled and the emails become the deduplicated union.
/// A non-blank website in `main` is never replaced, and no record is dropped.
#[must_use]
pub fn merge_into(main: &[EntityRecord], other: &[EntityRecord], key: MergeKey) -> Vec<EntityRecord> {
    let mut lookup: HashMap<String, Contacts> = HashMap::new();
    for record in other {
        let k = key.of(record);
        if k.is_empty() {
            continue;
        }
        let website = non_blank(record.website.as_deref());
        let emails = dedupe_emails(&record.emails);
        let entry = lookup.entry(k).or_default();
        if entry.website.is_none() {
            entry.website = website.map(str::to_owned);
        }
        entry.emails = dedupe_emails(entry.emails.iter().chain(emails.iter()));
    }

    main.iter()
        .map(|record| {
            let mut merged = record.clone();
            let k = key.of(record);
            match lookup.get(&k).filter(|_| !k.is_empty()) {
                None => merged.emails = dedupe_emails(&record.emails),
                Some(contacts) => {
                    if non_blank(record.website.as_deref()).is_none() {
                        if let Some(website) = &contacts.website {
                            merged.website = Some(website.clone());
                        }
                    }
                    merged.emails = dedupe_emails(record.emails.iter().chain(contacts.emails.iter()));
                }
            }
            merged
        })
        .collect()
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
