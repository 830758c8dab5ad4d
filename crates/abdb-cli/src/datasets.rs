//! Offline commands over existing dataset files.

use std::path::Path;

use abdb_core::{merge_into, MergeKey};
use abdb_store::{
    completed_keys, diff_by_registration, export_sni, read_records, read_references,
    write_records, write_sni_codes, write_sni_mapping,
};
use anyhow::Context;

/// Folds websites and emails from `other` into `main` and writes the result.
///
/// # Errors
///
/// Returns an error if either input cannot be read or `out` cannot be written.
pub(crate) fn run_merge(main: &Path, other: &Path, out: &Path) -> anyhow::Result<()> {
    let main_records =
        read_records(main).with_context(|| format!("failed to read {}", main.display()))?;
    let other_records =
        read_records(other).with_context(|| format!("failed to read {}", other.display()))?;

    let merged = merge_into(&main_records, &other_records, MergeKey::RegistrationNumber);
    write_records(out, &merged).with_context(|| format!("failed to write {}", out.display()))?;

    let with_website = merged.iter().filter(|r| r.website_value().is_some()).count();
    println!(
        "merge: {} records written to {} ({with_website} with website)",
        merged.len(),
        out.display()
    );
    Ok(())
}

/// Prints the records of `left` whose registration number is missing from
/// `right`, optionally writing them to `out`.
///
/// # Errors
///
/// Returns an error if an input cannot be read or `out` cannot be written.
pub(crate) fn run_diff(left: &Path, right: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let left_records =
        read_records(left).with_context(|| format!("failed to read {}", left.display()))?;
    let right_records =
        read_records(right).with_context(|| format!("failed to read {}", right.display()))?;

    let missing = diff_by_registration(&left_records, &right_records);
    println!(
        "diff: {} of {} records in {} are missing from {}",
        missing.len(),
        left_records.len(),
        left.display(),
        right.display()
    );
    for record in &missing {
        println!(
            "  {:<12}{}",
            record.org_number.as_deref().unwrap_or("-"),
            record.name
        );
    }

    if let Some(out) = out {
        write_records(out, &missing)
            .with_context(|| format!("failed to write {}", out.display()))?;
    }
    Ok(())
}

/// Writes the distinct SNI code table and the company-to-code mapping.
///
/// # Errors
///
/// Returns an error if `input` cannot be read or lacks an `sni_codes`
/// column, or an output cannot be written.
pub(crate) fn run_sni(input: &Path, unique: &Path, mapping: &Path) -> anyhow::Result<()> {
    let export =
        export_sni(input).with_context(|| format!("failed to read {}", input.display()))?;
    write_sni_codes(unique, &export.unique)
        .with_context(|| format!("failed to write {}", unique.display()))?;
    write_sni_mapping(mapping, &export.mapping)
        .with_context(|| format!("failed to write {}", mapping.display()))?;

    println!(
        "sni: {} distinct codes, {} company mappings",
        export.unique.len(),
        export.mapping.len()
    );
    Ok(())
}

/// Reports how many references in `all` are not yet in `done`.
///
/// Unlike the stages this never creates `done`; a missing file means
/// everything is pending.
///
/// # Errors
///
/// Returns an error if either file exists but cannot be read.
pub(crate) fn run_pending(all: &Path, done: &Path) -> anyhow::Result<()> {
    let references =
        read_references(all).with_context(|| format!("failed to read {}", all.display()))?;

    let pending = if done.exists() {
        let keys =
            completed_keys(done).with_context(|| format!("failed to read {}", done.display()))?;
        references
            .iter()
            .filter(|r| !keys.contains(&r.name_key()))
            .count()
    } else {
        references.len()
    };

    println!("pending: {pending} of {} references", references.len());
    Ok(())
}
