//! The persisted entity dataset: one CSV row per record in a fixed column
//! order, list cells encoded with [`abdb_core::encode_list`].

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use abdb_core::{decode_list, encode_list, EntityRecord, EntityReference};
use csv::StringRecord;

use crate::error::StoreError;

/// Column order of every record dataset.
pub const RECORD_COLUMNS: [&str; 18] = [
    "name",
    "profile_url",
    "emails",
    "org_number",
    "revenue",
    "legal_name",
    "registration_date",
    "company_type",
    "employees",
    "ceo",
    "address",
    "postal_address",
    "city",
    "share_capital",
    "sni_codes",
    "business_purpose",
    "phone",
    "website",
];

/// Column order of the enumeration output.
pub const REFERENCE_COLUMNS: [&str; 2] = ["name", "profile_url"];

/// Header-name lookup for one CSV file.
///
/// Files are read by column name, so datasets with extra, missing or
/// reordered columns still load. Missing columns read as absent.
pub(crate) struct Columns {
    positions: HashMap<String, usize>,
}

impl Columns {
    pub(crate) fn new(
        headers: &StringRecord,
        path: &Path,
        required: &[&'static str],
    ) -> Result<Self, StoreError> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_owned(), i))
            .collect();
        if let Some(column) = required.iter().copied().find(|c| !positions.contains_key(*c)) {
            return Err(StoreError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
        Ok(Self { positions })
    }

    /// Raw cell text, or `""` when the column is missing.
    pub(crate) fn raw<'r>(&self, row: &'r StringRecord, column: &str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
    }

    /// Trimmed cell text, `None` when blank.
    pub(crate) fn text(&self, row: &StringRecord, column: &str) -> Option<String> {
        let value = self.raw(row, column).trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_owned())
        }
    }
}

pub(crate) fn open_reader(path: &Path) -> Result<(csv::Reader<File>, StringRecord), StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| StoreError::csv(path, e))?
        .clone();
    Ok((reader, headers))
}

pub(crate) fn create_writer(path: &Path) -> Result<csv::Writer<File>, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    csv::Writer::from_path(path).map_err(|e| StoreError::csv(path, e))
}

/// Cells of `record` in [`RECORD_COLUMNS`] order.
#[must_use]
pub fn record_to_row(record: &EntityRecord) -> Vec<String> {
    fn opt(value: Option<&str>) -> String {
        value.unwrap_or_default().to_owned()
    }

    vec![
        record.name.clone(),
        record.profile_url.clone(),
        encode_list(&record.emails),
        opt(record.org_number.as_deref()),
        record.revenue.map(|r| r.to_string()).unwrap_or_default(),
        opt(record.legal_name.as_deref()),
        opt(record.registration_date.as_deref()),
        opt(record.company_type.as_deref()),
        opt(record.employees.as_deref()),
        opt(record.ceo.as_deref()),
        opt(record.address.as_deref()),
        opt(record.postal_address()),
        opt(record.city()),
        opt(record.share_capital.as_deref()),
        encode_list(&record.sni_codes),
        opt(record.business_purpose.as_deref()),
        opt(record.phone.as_deref()),
        opt(record.website.as_deref()),
    ]
}

/// Reads a whole-number cell; a float with an all-zero fraction is accepted.
fn parse_revenue(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse() {
        return Some(value);
    }
    let (whole, fraction) = cell.split_once('.')?;
    if fraction.chars().all(|c| c == '0') {
        whole.parse().ok()
    } else {
        None
    }
}

fn row_to_record(columns: &Columns, row: &StringRecord) -> EntityRecord {
    let mut record = EntityRecord::default();
    record.name = columns.raw(row, "name").trim().to_owned();
    record.profile_url = columns.raw(row, "profile_url").trim().to_owned();
    record.emails = decode_list(columns.raw(row, "emails"));
    record.org_number = columns.text(row, "org_number");
    record.revenue = parse_revenue(columns.raw(row, "revenue"));
    record.legal_name = columns.text(row, "legal_name");
    record.registration_date = columns.text(row, "registration_date");
    record.company_type = columns.text(row, "company_type");
    record.employees = columns.text(row, "employees");
    record.ceo = columns.text(row, "ceo");
    record.address = columns.text(row, "address");
    if let Some(postal_address) = columns.text(row, "postal_address") {
        record.set_postal_address(postal_address);
    }
    record.share_capital = columns.text(row, "share_capital");
    record.sni_codes = decode_list(columns.raw(row, "sni_codes"));
    record.business_purpose = columns.text(row, "business_purpose");
    record.phone = columns.text(row, "phone");
    record.website = columns.text(row, "website");
    record
}

/// Loads every record of a dataset.
///
/// # Errors
///
/// - [`StoreError::Csv`] if the file cannot be opened or parsed.
/// - [`StoreError::MissingColumn`] if it has no `name` column.
pub fn read_records(path: &Path) -> Result<Vec<EntityRecord>, StoreError> {
    let (mut reader, headers) = open_reader(path)?;
    let columns = Columns::new(&headers, path, &["name"])?;
    reader
        .records()
        .map(|row| {
            let row = row.map_err(|e| StoreError::csv(path, e))?;
            Ok(row_to_record(&columns, &row))
        })
        .collect()
}

/// Writes `records` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the parent directory cannot be created and
/// [`StoreError::Csv`] on any write failure.
pub fn write_records(path: &Path, records: &[EntityRecord]) -> Result<(), StoreError> {
    let mut writer = create_writer(path)?;
    writer
        .write_record(RECORD_COLUMNS)
        .map_err(|e| StoreError::csv(path, e))?;
    for record in records {
        writer
            .write_record(record_to_row(record))
            .map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))
}

/// Loads the enumeration output.
///
/// # Errors
///
/// - [`StoreError::Csv`] if the file cannot be opened or parsed.
/// - [`StoreError::MissingColumn`] if `name` or `profile_url` is missing.
pub fn read_references(path: &Path) -> Result<Vec<EntityReference>, StoreError> {
    let (mut reader, headers) = open_reader(path)?;
    let columns = Columns::new(&headers, path, &REFERENCE_COLUMNS)?;
    reader
        .records()
        .map(|row| {
            let row = row.map_err(|e| StoreError::csv(path, e))?;
            Ok(EntityReference::new(
                columns.raw(&row, "name").trim(),
                columns.raw(&row, "profile_url").trim(),
            ))
        })
        .collect()
}

/// Writes references to `path`, replacing any existing file.
///
/// # Errors
///
/// Same as [`write_records`].
pub fn write_references(path: &Path, references: &[EntityReference]) -> Result<(), StoreError> {
    let mut writer = create_writer(path)?;
    writer
        .write_record(REFERENCE_COLUMNS)
        .map_err(|e| StoreError::csv(path, e))?;
    for reference in references {
        writer
            .write_record([reference.name.as_str(), reference.profile_url.as_str()])
            .map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
#[path = "dataset_test.rs"]
mod tests;
