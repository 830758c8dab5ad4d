//! Checkpoint store: which references still need work, and durable
//! one-row-at-a-time progress.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use abdb_core::{EntityRecord, EntityReference};

use crate::dataset::{create_writer, open_reader, record_to_row, Columns, RECORD_COLUMNS};
use crate::error::StoreError;

/// Anything that can be matched against completed records by name.
pub trait NameKeyed {
    fn name_key(&self) -> String;
}

impl NameKeyed for EntityReference {
    fn name_key(&self) -> String {
        EntityReference::name_key(self)
    }
}

impl NameKeyed for EntityRecord {
    fn name_key(&self) -> String {
        EntityRecord::name_key(self)
    }
}

/// Creates `path` holding only the record header if it does not exist yet.
///
/// Returns `true` if the file was created.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Csv`] if the file cannot be
/// created.
pub fn ensure_dataset(path: &Path) -> Result<bool, StoreError> {
    if path.exists() {
        return Ok(false);
    }
    let mut writer = create_writer(path)?;
    writer
        .write_record(RECORD_COLUMNS)
        .map_err(|e| StoreError::csv(path, e))?;
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(true)
}

/// Normalized names of every row in a completed dataset.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if the file cannot be read and
/// [`StoreError::MissingColumn`] if it has no `name` column.
pub fn completed_keys(path: &Path) -> Result<HashSet<String>, StoreError> {
    let (mut reader, headers) = open_reader(path)?;
    let columns = Columns::new(&headers, path, &["name"])?;
    let mut keys = HashSet::new();
    for row in reader.records() {
        let row = row.map_err(|e| StoreError::csv(path, e))?;
        keys.insert(abdb_core::name_key(columns.raw(&row, "name")));
    }
    Ok(keys)
}

/// Items of `all` whose normalized name is not yet in the dataset at `done`.
///
/// A missing `done` dataset is created empty (header only) and everything is
/// pending. Input order is preserved.
///
/// # Errors
///
/// Returns [`StoreError`] if `done` cannot be created or read.
pub fn pending_work<T: NameKeyed>(all: Vec<T>, done: &Path) -> Result<Vec<T>, StoreError> {
    if ensure_dataset(done)? {
        tracing::info!(path = %done.display(), "initialised empty dataset");
        return Ok(all);
    }
    let completed = completed_keys(done)?;
    let total = all.len();
    let pending: Vec<T> = all
        .into_iter()
        .filter(|item| !completed.contains(&item.name_key()))
        .collect();
    tracing::info!(
        path = %done.display(),
        total,
        completed = total - pending.len(),
        pending = pending.len(),
        "computed pending work"
    );
    Ok(pending)
}

/// Appends records to a dataset, flushing after every row.
///
/// A crash loses at most the record being written, never earlier rows.
pub struct DatasetAppender {
    path: PathBuf,
    writer: csv::Writer<File>,
    appended: usize,
}

impl DatasetAppender {
    /// Opens `path` for appending, writing the header first if the file is
    /// new or empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file or its directory cannot be
    /// created or opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let needs_header = std::fs::metadata(path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::io(path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(RECORD_COLUMNS)
                .map_err(|e| StoreError::csv(path, e))?;
            writer.flush().map_err(|e| StoreError::io(path, e))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            appended: 0,
        })
    }

    /// Writes one record and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] or [`StoreError::Io`] if the row cannot be
    /// written.
    pub fn append(&mut self, record: &EntityRecord) -> Result<(), StoreError> {
        self.writer
            .write_record(record_to_row(record))
            .map_err(|e| StoreError::csv(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|e| StoreError::io(&self.path, e))?;
        self.appended += 1;
        Ok(())
    }

    /// Records appended through this handle.
    #[must_use]
    pub fn appended(&self) -> usize {
        self.appended
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for DatasetAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetAppender")
            .field("path", &self.path)
            .field("appended", &self.appended)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "checkpoint_test.rs"]
mod tests;
