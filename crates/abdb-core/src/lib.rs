//! Shared domain types and configuration for the `abdb` company harvester.
//!
//! Everything in this crate is pure: no I/O beyond reading environment
//! variables. Network access lives in `abdb-scraper`, persistence in
//! `abdb-store`.

pub mod app_config;
pub mod config;
pub mod harvest;
pub mod keys;
pub mod list_codec;
pub mod merge;
pub mod records;

pub use app_config::{AppConfig, SearchProvider};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use harvest::HarvestConfig;
pub use keys::{name_key, registration_key};
pub use list_codec::{decode_list, encode_list};
pub use merge::{dedupe_emails, merge_into, MergeKey};
pub use records::{derive_city, EntityRecord, EntityReference};
