//! The master vocabulary: a durable, cross-project authority file.
//!
//! Entries are created from the bundled seed list at construction or
//! promoted ad hoc from reconciliation records; they are mutated in place
//! by user edits and never deleted. Identities are never reused.

use arclens_core::defaults::{seed_vocabulary, SEED_VOCABULARY_CEILING};
use arclens_core::{AuthorityRecord, EntityType, Error, Result};
use tracing::{debug, info};

/// Partial update for an authority record's biographical fields.
///
/// Fields left as `None` are untouched; there are no cross-field
/// invariants.
#[derive(Debug, Clone, Default)]
pub struct AuthorityUpdate {
    pub life_span: Option<String>,
    pub affiliation: Option<String>,
    pub religion: Option<String>,
    pub nationality: Option<String>,
    pub gender: Option<String>,
    pub alias_names: Option<Vec<String>>,
    pub external_links: Option<String>,
    pub notes: Option<String>,
}

/// Insertion-ordered store of authority records.
#[derive(Debug, Clone)]
pub struct VocabularyStore {
    entries: Vec<AuthorityRecord>,
    next_id: u32,
}

impl VocabularyStore {
    /// Create a store seeded from the bundled authority list.
    pub fn from_seed() -> Self {
        let entries = seed_vocabulary();
        info!(entry_count = entries.len(), "Seeding master vocabulary");
        Self::from_entries(entries)
    }

    /// Rebuild a store from persisted entries (backup restore).
    ///
    /// The id counter resumes above both the seed ceiling and the highest
    /// persisted id, so restored projects never re-issue an identity.
    pub fn from_entries(entries: Vec<AuthorityRecord>) -> Self {
        let max_id = entries.iter().map(|a| a.id).max().unwrap_or(0);
        Self {
            entries,
            next_id: SEED_VOCABULARY_CEILING.max(max_id + 1),
        }
    }

    /// Current vocabulary snapshot, in insertion order.
    pub fn entries(&self) -> &[AuthorityRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&AuthorityRecord> {
        self.entries.iter().find(|a| a.id == id)
    }

    /// Add a new authority record, assigning the next never-reused id.
    /// Returns the new entry's id.
    pub fn add(&mut self, name: impl Into<String>, entity_type: EntityType) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        let name = name.into();
        debug!(authority_id = id, name = %name, %entity_type, "Adding authority record");
        self.entries.push(AuthorityRecord::new(id, name, entity_type));
        id
    }

    /// Rename an authority record. The identity is unchanged; records
    /// already matched keep their snapshotted `matched_name` until the
    /// user explicitly re-matches.
    pub fn rename(&mut self, id: u32, new_name: impl Into<String>) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(Error::UnknownAuthority(id))?;
        entry.name = new_name.into();
        Ok(())
    }

    /// Apply a partial biographical update to one entry.
    pub fn update(&mut self, id: u32, update: AuthorityUpdate) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(Error::UnknownAuthority(id))?;
        if let Some(v) = update.life_span {
            entry.life_span = Some(v);
        }
        if let Some(v) = update.affiliation {
            entry.affiliation = Some(v);
        }
        if let Some(v) = update.religion {
            entry.religion = Some(v);
        }
        if let Some(v) = update.nationality {
            entry.nationality = Some(v);
        }
        if let Some(v) = update.gender {
            entry.gender = Some(v);
        }
        if let Some(v) = update.alias_names {
            entry.alias_names = v;
        }
        if let Some(v) = update.external_links {
            entry.external_links = Some(v);
        }
        if let Some(v) = update.notes {
            entry.notes = Some(v);
        }
        Ok(())
    }

    /// Consume the store, yielding the entries for serialization.
    pub fn into_entries(self) -> Vec<AuthorityRecord> {
        self.entries
    }
}

impl Default for VocabularyStore {
    fn default() -> Self {
        Self::from_seed()
    }
}
