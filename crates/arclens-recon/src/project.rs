//! The project controller: single owner of all mutable project state.
//!
//! All mutation flows through the named operations here; nothing else
//! hands out `&mut` access to the underlying stores. Re-sync is an
//! explicit operation, not a side effect of edits, so callers control
//! when the (cheap but visible) recomputation happens.

use tracing::info;
use uuid::Uuid;

use arclens_core::{
    AppState, ArchivalPage, AuthorityRecord, Cluster, EntityType, Error, ReconciliationRecord,
    Result, Tier,
};

use crate::aggregator::aggregate;
use crate::clusters::ClusterStore;
use crate::records::RecordStore;
use crate::vocabulary::{AuthorityUpdate, VocabularyStore};

/// Owns pages, clusters, the reconciliation list, and the master
/// vocabulary for one open project.
#[derive(Debug, Clone)]
pub struct ProjectController {
    pages: Vec<ArchivalPage>,
    clusters: ClusterStore,
    records: RecordStore,
    vocabulary: VocabularyStore,
    tier: Tier,
}

impl ProjectController {
    /// Create an empty project with the seed vocabulary.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            clusters: ClusterStore::default(),
            records: RecordStore::default(),
            vocabulary: VocabularyStore::from_seed(),
            tier: Tier::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn pages(&self) -> &[ArchivalPage] {
        &self.pages
    }

    pub fn clusters(&self) -> &ClusterStore {
        &self.clusters
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn vocabulary(&self) -> &VocabularyStore {
        &self.vocabulary
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
    }

    // -------------------------------------------------------------------------
    // Pages
    // -------------------------------------------------------------------------

    pub fn add_pages(&mut self, pages: Vec<ArchivalPage>) {
        info!(page_count = pages.len(), "Adding pages to project");
        self.pages.extend(pages);
    }

    /// Targeted edit of one page. The closure receives the live page.
    pub fn update_page<F>(&mut self, id: Uuid, edit: F) -> Result<()>
    where
        F: FnOnce(&mut ArchivalPage),
    {
        let page = self
            .pages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Error::PageNotFound(id))?;
        edit(page);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Clusters
    // -------------------------------------------------------------------------

    /// Swap in a new cluster list after a clustering run. The
    /// reconciliation list is stale until [`Self::resync`] is called.
    pub fn replace_clusters(&mut self, clusters: Vec<Cluster>) {
        self.clusters.replace(clusters);
    }

    /// Targeted edit of one cluster's fields. Also leaves the
    /// reconciliation list stale until the next re-sync.
    pub fn update_cluster<F>(&mut self, id: i64, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Cluster),
    {
        self.clusters.update(id, edit)
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Recompute the reconciliation list from current pages, clusters, and
    /// vocabulary. User state carries over per the aggregation contract;
    /// the swap is atomic, with no visible intermediate state.
    pub fn resync(&mut self) {
        let next = aggregate(
            &self.pages,
            self.clusters.clusters(),
            self.records.records(),
            self.vocabulary.entries(),
        );
        info!(
            record_count = next.len(),
            page_count = self.pages.len(),
            cluster_count = self.clusters.len(),
            "Reconciliation list resynced"
        );
        self.records.replace(next);
    }

    /// Link a record to an authority entry, snapshotting the entry's
    /// current name. Fails with [`Error::UnknownAuthority`] rather than
    /// creating a dangling reference.
    pub fn set_match(&mut self, record_id: Uuid, authority_id: u32) -> Result<()> {
        let entry = self
            .vocabulary
            .get(authority_id)
            .ok_or(Error::UnknownAuthority(authority_id))?;
        let name = entry.name.clone();
        self.records.set_match(record_id, authority_id, name)
    }

    pub fn unlink(&mut self, record_id: Uuid) -> Result<()> {
        self.records.unlink(record_id)
    }

    pub fn reject(&mut self, record_id: Uuid) -> Result<()> {
        self.records.reject(record_id)
    }

    pub fn promote_to_custom(&mut self, record_id: Uuid) -> Result<()> {
        self.records.promote_to_custom(record_id)
    }

    pub fn rename_record(&mut self, record_id: Uuid, new_name: impl Into<String>) -> Result<()> {
        self.records.rename_extracted(record_id, new_name)
    }

    pub fn set_appearance_note(
        &mut self,
        record_id: Uuid,
        location_id: &str,
        note: impl Into<String>,
    ) -> Result<()> {
        self.records.set_appearance_note(record_id, location_id, note)
    }

    // -------------------------------------------------------------------------
    // Vocabulary
    // -------------------------------------------------------------------------

    pub fn add_authority(&mut self, name: impl Into<String>, entity_type: EntityType) -> u32 {
        self.vocabulary.add(name, entity_type)
    }

    pub fn rename_authority(&mut self, id: u32, new_name: impl Into<String>) -> Result<()> {
        self.vocabulary.rename(id, new_name)
    }

    pub fn update_authority(&mut self, id: u32, update: AuthorityUpdate) -> Result<()> {
        self.vocabulary.update(id, update)
    }

    /// Mint a new authority entry from a record's extracted name and type,
    /// then match the record to it. Returns the new authority id.
    pub fn promote_to_authority(&mut self, record_id: Uuid) -> Result<u32> {
        let record = self
            .records
            .get(record_id)
            .ok_or(Error::RecordNotFound(record_id))?;
        let name = record.extracted_name.clone();
        let entity_type = record.entity_type;
        let authority_id = self.vocabulary.add(name.clone(), entity_type);
        self.records.set_match(record_id, authority_id, name)?;
        Ok(authority_id)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Snapshot the project into the serializable state shape.
    pub fn to_app_state(&self) -> AppState {
        AppState {
            files: self.pages.clone(),
            clusters: self.clusters.clusters().to_vec(),
            reconciliation_list: self.records.records().to_vec(),
            master_vocabulary: self.vocabulary.entries().to_vec(),
            tier: self.tier,
        }
    }

    /// Rebuild a controller from persisted state. An empty persisted
    /// vocabulary falls back to the seed list.
    pub fn from_app_state(state: AppState) -> Self {
        let vocabulary = if state.master_vocabulary.is_empty() {
            VocabularyStore::from_seed()
        } else {
            VocabularyStore::from_entries(state.master_vocabulary)
        };
        Self {
            pages: state.files,
            clusters: ClusterStore::new(state.clusters),
            records: RecordStore::new(state.reconciliation_list),
            vocabulary,
            tier: state.tier,
        }
    }

    /// Current record list, for export projections.
    pub fn record_list(&self) -> &[ReconciliationRecord] {
        self.records.records()
    }

    /// Current vocabulary snapshot, for export projections.
    pub fn authority_list(&self) -> &[AuthorityRecord] {
        self.vocabulary.entries()
    }
}

impl Default for ProjectController {
    fn default() -> Self {
        Self::new()
    }
}
