//! Normalized keys used to match entities across datasets.
//!
//! Two key kinds exist: the name key (checkpointing of references) and the
//! registration key (merging contact datasets). An empty key never matches
//! anything, including another empty key.

/// Lowercased, trimmed company name.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Digits-only organisation number, so `556123-4567 == 5561234567`.
///
/// `None`, blank and the textual `nan` placeholder all normalize to `""`.
#[must_use]
pub fn registration_key(org_number: Option<&str>) -> String {
    let Some(raw) = org_number else {
        return String::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return String::new();
    }
    trimmed.chars().filter(char::is_ascii_digit).collect()
}
