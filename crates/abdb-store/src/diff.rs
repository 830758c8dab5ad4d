//! Dataset difference by registration number.

use std::collections::HashSet;

use abdb_core::EntityRecord;

fn trimmed_org_number(record: &EntityRecord) -> &str {
    record.org_number.as_deref().map_or("", str::trim)
}

/// Records of `left` whose trimmed registration number does not occur in
/// `right`, in `left` order.
///
/// Numbers are compared as written, so `556123-4567` and `5561234567` are
/// different keys. Records without a number share the empty key.
#[must_use]
pub fn diff_by_registration(left: &[EntityRecord], right: &[EntityRecord]) -> Vec<EntityRecord> {
    let right_keys: HashSet<&str> = right.iter().map(trimmed_org_number).collect();
    left.iter()
        .filter(|record| !right_keys.contains(trimmed_org_number(record)))
        .cloned()
        .collect()
}
