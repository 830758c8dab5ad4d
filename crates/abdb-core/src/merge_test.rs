use super::*;

fn record(name: &str, org: Option<&str>, website: Option<&str>, emails: &[&str]) -> EntityRecord {
    let mut r = EntityRecord::default();
    r.name = name.to_owned();
    r.org_number = org.map(str::to_owned);
    r.website = website.map(str::to_owned);
    r.emails = emails.iter().map(|e| (*e).to_owned()).collect();
    r
}

// -----------------------------------------------------------------------
// dedupe_emails
// -----------------------------------------------------------------------

#[test]
fn dedupe_is_case_insensitive_and_keeps_first_spelling() {
    let out = dedupe_emails(["Info@Acme.se", "info@acme.se", "INFO@ACME.SE"]);
    assert_eq!(out, vec!["Info@Acme.se".to_owned()]);
}

#[test]
fn dedupe_strips_quotes_and_whitespace() {
    let out = dedupe_emails([" 'sales@acme.se' ", "\"sales@acme.se\"", "sales@acme.se"]);
    assert_eq!(out, vec!["sales@acme.se".to_owned()]);
}

#[test]
fn dedupe_drops_empty_entries() {
    let out = dedupe_emails(["", "  ", "''", "a@b.se"]);
    assert_eq!(out, vec!["a@b.se".to_owned()]);
}

// -----------------------------------------------------------------------
// merge_into
// -----------------------------------------------------------------------

#[test]
fn fills_blank_website_from_other() {
    let main = vec![record("Acme", Some("556123-4567"), None, &[])];
    let other = vec![record("Acme AB", Some("5561234567"), Some("https://acme.se"), &[])];
    let merged = merge_into(&main, &other, MergeKey::RegistrationNumber);
    assert_eq!(merged[0].website.as_deref(), Some("https://acme.se"));
}

#[test]
fn never_overwrites_existing_website() {
    let main = vec![record("Acme", Some("5561234567"), Some("https://acme.se"), &[])];
    let other = vec![record("Acme", Some("5561234567"), Some("https://other.se"), &[])];
    let merged = merge_into(&main, &other, MergeKey::RegistrationNumber);
    assert_eq!(merged[0].website.as_deref(), Some("https://acme.se"));
}

#[test]
fn whitespace_website_counts_as_blank() {
    let main = vec![record("Acme", Some("5561234567"), Some("  "), &[])];
    let other = vec![record("Acme", Some("5561234567"), Some("https://acme.se"), &[])];
    let merged = merge_into(&main, &other, MergeKey::RegistrationNumber);
    assert_eq!(merged[0].website.as_deref(), Some("https://acme.se"));
}

#[test]
fn emails_become_deduplicated_union() {
    let main = vec![record("Acme", Some("5561234567"), None, &["info@acme.se", "INFO@acme.se"])];
    let other = vec![record("Acme", Some("5561234567"), None, &["Info@Acme.se", "sales@acme.se"])];
    let merged = merge_into(&main, &other, MergeKey::RegistrationNumber);
    assert_eq!(merged[0].emails, vec!["info@acme.se".to_owned(), "sales@acme.se".to_owned()]);
}

#[test]
fn duplicate_keys_in_other_fold_first_non_empty_website_wins() {
    let main = vec![record("Acme", Some("5561234567"), None, &[])];
    let other = vec![
        record("Acme", Some("556123-4567"), None, &["a@acme.se"]),
        record("Acme", Some("5561234567"), Some("https://first.se"), &["b@acme.se"]),
        record("Acme", Some("5561234567"), Some("https://second.se"), &["a@acme.se"]),
    ];
    let merged = merge_into(&main, &other, MergeKey::RegistrationNumber);
    assert_eq!(merged[0].website.as_deref(), Some("https://first.se"));
    assert_eq!(merged[0].emails, vec!["a@acme.se".to_owned(), "b@acme.se".to_owned()]);
}

#[test]
fn unmatched_records_still_dedupe_their_own_emails() {
    let main = vec![record("Solo", Some("5569999999"), None, &["x@solo.se", "X@SOLO.SE"])];
    let merged = merge_into(&main, &[], MergeKey::RegistrationNumber);
    assert_eq!(merged[0].emails, vec!["x@solo.se".to_owned()]);
}

#[test]
fn empty_keys_never_match() {
    let main = vec![record("NoOrg", None, None, &[])];
    let other = vec![record("AlsoNoOrg", None, Some("https://wrong.se"), &["w@wrong.se"])];
    let merged = merge_into(&main, &other, MergeKey::RegistrationNumber);
    assert!(merged[0].website.is_none());
    assert!(merged[0].emails.is_empty());
}

#[test]
fn merge_never_drops_records_and_preserves_order() {
    let main = vec![
        record("A", Some("1111111111"), Some("https://a.se"), &[]),
        record("B", None, None, &[]),
        record("C", Some("3333333333"), None, &[]),
    ];
    let other = vec![record("C", Some("3333333333"), Some("https://c.se"), &[])];
    let merged = merge_into(&main, &other, MergeKey::RegistrationNumber);
    assert_eq!(merged.len(), main.len());
    let names: Vec<&str> = merged.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C"]);
    assert_eq!(merged[0].website.as_deref(), Some("https://a.se"));
}

#[test]
fn merge_leaves_other_fields_untouched() {
    let mut main_record = record("Acme", Some("5561234567"), None, &[]);
    main_record.revenue = Some(1200);
    main_record.set_postal_address("703 61 Örebro");
    let merged = merge_into(
        &[main_record.clone()],
        &[record("Acme", Some("5561234567"), Some("https://acme.se"), &[])],
        MergeKey::RegistrationNumber,
    );
    assert_eq!(merged[0].revenue, Some(1200));
    assert_eq!(merged[0].city(), Some("Örebro"));
    assert_eq!(merged[0].org_number, main_record.org_number);
}

#[test]
fn merge_by_name_key() {
    let main = vec![record("  ACME AB ", None, None, &[])];
    let other = vec![record("acme ab", None, Some("https://acme.se"), &[])];
    let merged = merge_into(&main, &other, MergeKey::Name);
    assert_eq!(merged[0].website.as_deref(), Some("https://acme.se"));
}
