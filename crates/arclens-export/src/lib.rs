//! # arclens-export
//!
//! Flat export projections over the project state: TSV tables for
//! spreadsheet work and JSON documents for interchange and backup.
//!
//! Exports are pure projections. They read the state and produce text;
//! nothing here mutates the project or persists derived fields.

pub mod json;
pub mod tsv;

pub use json::{backup_json, full_json, restore_backup, BACKUP_TYPE, BACKUP_VERSION};
pub use tsv::{authority_tsv, clusters_tsv, entity_index_tsv, pages_tsv};
