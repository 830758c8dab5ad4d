//! Page field extraction: the seam between pagination/detail logic and the
//! markup of a particular directory.

mod allabolag;
mod patch;

pub use allabolag::AllabolagExtractor;
pub use patch::FieldPatch;

use abdb_core::EntityReference;

/// One independent, best-effort field extraction rule.
///
/// Each rule looks for a single structural pattern on a profile page.
/// [`FieldRule::ORDER`] is the order the detail extractor applies them in;
/// when two rules set the same field, the later rule's value is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Accounting figures table (revenue).
    AccountingTable,
    /// Labeled official company information (legal name, org number, CEO, addresses, ...).
    OfficialInfo,
    /// Contact card labels read as plain text (email, website).
    ContactLabels,
    /// Industry classification links (SNI codes).
    IndustryCodes,
    /// Contact card read through its links and buttons (phone, website href, email, addresses).
    ContactInfo,
    /// Free-text description of the business purpose.
    BusinessPurpose,
}

impl FieldRule {
    pub const ORDER: [FieldRule; 6] = [
        FieldRule::AccountingTable,
        FieldRule::OfficialInfo,
        FieldRule::ContactLabels,
        FieldRule::IndustryCodes,
        FieldRule::ContactInfo,
        FieldRule::BusinessPurpose,
    ];
}

/// Directory-specific knowledge of where fields live in a page.
///
/// Implementations never fail: structure that is missing simply yields no
/// references or an empty [`FieldPatch`].
pub trait PageFieldExtractor: Send + Sync {
    /// Company references found on one listing page, in page order.
    fn extract_references(&self, page: &str) -> Vec<EntityReference>;

    /// Fields that `rule` can read from a profile page.
    fn extract_fields(&self, page: &str, rule: FieldRule) -> FieldPatch;
}

/// Parses an integer written with locale thousands separators.
///
/// Regular, non-breaking and narrow no-break spaces are removed and a
/// Unicode minus sign is read as `-`. Anything else that is not a digit
/// makes the value absent rather than zero.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '\u{a0}' | '\u{202f}'))
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();
    cleaned.parse().ok()
}
