//! CSV persistence for harvested company records.
//!
//! Stage outputs are plain CSV files with a fixed header. The checkpoint
//! helpers make every stage resumable: work is filtered against what a
//! stage's output already holds, and each finished record is appended and
//! flushed on its own.

pub mod checkpoint;
pub mod dataset;
pub mod diff;
pub mod error;
pub mod sni;

pub use checkpoint::{completed_keys, ensure_dataset, pending_work, DatasetAppender, NameKeyed};
pub use dataset::{
    read_records, read_references, record_to_row, write_records, write_references,
    RECORD_COLUMNS, REFERENCE_COLUMNS,
};
pub use diff::diff_by_registration;
pub use error::StoreError;
pub use sni::{
    export_sni, parse_sni_cell, split_code, write_sni_codes, write_sni_mapping, CompanySni,
    SniCode, SniExport,
};
