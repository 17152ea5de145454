//! # arclens-recon
//!
//! The entity reconciliation and cluster consolidation engine.
//!
//! This crate aggregates raw entity mentions scattered across AI-analyzed
//! pages and clusters into deduplicated, evidence-linked reconciliation
//! records, resolves them against the master vocabulary, and keeps the
//! result re-computable and user-correctable as source data changes.
//!
//! The engine is pure and synchronous: it reads pages, clusters, and the
//! vocabulary, and produces a new record list that the project controller
//! swaps in atomically. All external AI calls live in `arclens-inference`.

pub mod aggregator;
pub mod clusters;
pub mod matcher;
pub mod project;
pub mod records;
pub mod vocabulary;

pub use aggregator::aggregate;
pub use clusters::ClusterStore;
pub use matcher::{resolve, resolve_entry};
pub use project::ProjectController;
pub use records::RecordStore;
pub use vocabulary::{AuthorityUpdate, VocabularyStore};
