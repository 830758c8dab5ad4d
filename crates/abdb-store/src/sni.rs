//! SNI industry code export.
//!
//! Splits each record's `sni_codes` cell into `(code, description)` pairs and
//! produces a deduplicated code table plus a company-to-code mapping.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use abdb_core::decode_list;
use regex::Regex;

use crate::dataset::{create_writer, open_reader, Columns};
use crate::error::StoreError;

/// `NNNNN description` items inside a list-shaped cell that did not decode.
static SNI_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\d{5})\s+([^\]]+?)(?:',|",|\]|$)"#).expect("valid sni item regex")
});

static SNI_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{5})\s+(.*)$").expect("valid sni split regex"));

/// One five-digit SNI code and its description.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SniCode {
    pub code: String,
    pub description: String,
}

/// A company's association with one SNI code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanySni {
    pub org_number: String,
    pub legal_name: String,
    pub sni: SniCode,
}

/// Result of [`export_sni`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SniExport {
    /// Every distinct `(code, description)`, sorted.
    pub unique: Vec<SniCode>,
    /// One row per `(org_number, code)`, first occurrence kept.
    pub mapping: Vec<CompanySni>,
}

/// Items of an `sni_codes` cell.
///
/// The typed list decoding is tried first; when it yields nothing, items
/// are recovered from the raw text.
#[must_use]
pub fn parse_sni_cell(cell: &str) -> Vec<String> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Vec::new();
    }
    let items = decode_list(cell);
    if !items.is_empty() {
        return items;
    }

    let inner = cell
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(cell)
        .replace('\u{2019}', "'")
        .replace(['\u{201c}', '\u{201d}'], "\"");
    SNI_ITEM_RE
        .captures_iter(&inner)
        .map(|caps| {
            let description = caps[2].trim().trim_matches(['\'', '"']).trim();
            format!("{} {description}", &caps[1])
        })
        .collect()
}

/// Splits `"62010 Dataprogrammering"` into code and description.
#[must_use]
pub fn split_code(item: &str) -> Option<SniCode> {
    let caps = SNI_SPLIT_RE.captures(item.trim())?;
    let description = caps[2].trim();
    if description.is_empty() {
        return None;
    }
    Some(SniCode {
        code: caps[1].to_owned(),
        description: description.to_owned(),
    })
}

/// Reads a record dataset and builds the SNI code table and mapping.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if the file cannot be read and
/// [`StoreError::MissingColumn`] if it has no `sni_codes` column.
pub fn export_sni(path: &Path) -> Result<SniExport, StoreError> {
    let (mut reader, headers) = open_reader(path)?;
    let columns = Columns::new(&headers, path, &["sni_codes"])?;

    let mut unique = BTreeSet::new();
    let mut mapping = Vec::new();
    let mut seen = HashSet::new();

    for row in reader.records() {
        let row = row.map_err(|e| StoreError::csv(path, e))?;
        let org_number = columns.raw(&row, "org_number").trim().to_owned();
        let legal_name = columns.raw(&row, "legal_name").trim().to_owned();

        for sni in parse_sni_cell(columns.raw(&row, "sni_codes"))
            .iter()
            .filter_map(|item| split_code(item))
        {
            unique.insert(sni.clone());
            if seen.insert((org_number.clone(), sni.code.clone())) {
                mapping.push(CompanySni {
                    org_number: org_number.clone(),
                    legal_name: legal_name.clone(),
                    sni,
                });
            }
        }
    }

    Ok(SniExport {
        unique: unique.into_iter().collect(),
        mapping,
    })
}

/// Writes the `sni_code, sni_description` table.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn write_sni_codes(path: &Path, codes: &[SniCode]) -> Result<(), StoreError> {
    let mut writer = create_writer(path)?;
    writer
        .write_record(["sni_code", "sni_description"])
        .map_err(|e| StoreError::csv(path, e))?;
    for sni in codes {
        writer
            .write_record([sni.code.as_str(), sni.description.as_str()])
            .map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))
}

/// Writes the `org_number, legal_name, sni_code, sni_description` mapping.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn write_sni_mapping(path: &Path, mapping: &[CompanySni]) -> Result<(), StoreError> {
    let mut writer = create_writer(path)?;
    writer
        .write_record(["org_number", "legal_name", "sni_code", "sni_description"])
        .map_err(|e| StoreError::csv(path, e))?;
    for row in mapping {
        writer
            .write_record([
                row.org_number.as_str(),
                row.legal_name.as_str(),
                row.sni.code.as_str(),
                row.sni.description.as_str(),
            ])
            .map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))
}
