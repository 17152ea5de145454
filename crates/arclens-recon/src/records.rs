//! Project-scoped reconciliation record store.
//!
//! Holds the current deduplicated entity list and exposes the named state
//! machine operations. State changes are valid only through these methods;
//! the aggregator replaces the whole list via [`RecordStore::replace`].

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use arclens_core::{Error, ReconciliationRecord, RecordStatus, Result};

/// Insertion-ordered store of reconciliation records, addressed by id.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<ReconciliationRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<ReconciliationRecord>) -> Self {
        Self { records }
    }

    /// Current record list, in aggregation order.
    pub fn records(&self) -> &[ReconciliationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&ReconciliationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Atomically swap in a freshly aggregated list. The previous list is
    /// returned so callers can log or diff it.
    pub fn replace(&mut self, records: Vec<ReconciliationRecord>) -> Vec<ReconciliationRecord> {
        std::mem::replace(&mut self.records, records)
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut ReconciliationRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::RecordNotFound(id))
    }

    /// Link a record to an authority entry.
    ///
    /// `authority_name` is the vocabulary name at call time; it is stored
    /// as a snapshot. Callers are responsible for having looked the id up
    /// in a live vocabulary listing first.
    pub fn set_match(
        &mut self,
        id: Uuid,
        authority_id: u32,
        authority_name: impl Into<String>,
    ) -> Result<()> {
        let record = self.get_mut(id)?;
        record.set_match(authority_id, authority_name);
        debug!(record_id = %id, authority_id, "Record matched");
        Ok(())
    }

    /// Drop the authority link and return the record to review.
    pub fn unlink(&mut self, id: Uuid) -> Result<()> {
        let record = self.get_mut(id)?;
        record.clear_match(RecordStatus::Pending);
        Ok(())
    }

    /// Mark the record as not an entity worth tracking.
    pub fn reject(&mut self, id: Uuid) -> Result<()> {
        let record = self.get_mut(id)?;
        record.clear_match(RecordStatus::Rejected);
        Ok(())
    }

    /// Keep the record in the project index without an authority link.
    pub fn promote_to_custom(&mut self, id: Uuid) -> Result<()> {
        let record = self.get_mut(id)?;
        record.clear_match(RecordStatus::Custom);
        record.added_at = Some(Utc::now());
        Ok(())
    }

    /// Rename the extracted form of the mention. The grouping key is not
    /// rewritten retroactively; the next aggregation pass treats the new
    /// name as a new key.
    pub fn rename_extracted(&mut self, id: Uuid, new_name: impl Into<String>) -> Result<()> {
        let record = self.get_mut(id)?;
        record.extracted_name = new_name.into();
        Ok(())
    }

    /// Replace the note on one source appearance. A `location_id` with no
    /// matching appearance is a no-op.
    pub fn set_appearance_note(
        &mut self,
        id: Uuid,
        location_id: &str,
        note: impl Into<String>,
    ) -> Result<()> {
        let record = self.get_mut(id)?;
        if let Some(appearance) = record
            .source_appearances
            .iter_mut()
            .find(|a| a.location_id == location_id)
        {
            appearance.note = note.into();
        }
        Ok(())
    }

    /// Consume the store, yielding the records for serialization.
    pub fn into_records(self) -> Vec<ReconciliationRecord> {
        self.records
    }
}
