//! Cluster list storage and consolidation bookkeeping.
//!
//! Clustering itself is an external AI pass (see `arclens-inference`); this
//! store handles the two mutations its results flow through: wholesale
//! replacement after a clustering run, and targeted per-cluster edits.
//! Either one leaves the reconciliation list stale until the next explicit
//! re-sync.

use tracing::info;

use arclens_core::{Cluster, Error, Result};

/// Insertion-ordered store of document clusters, addressed by id.
#[derive(Debug, Clone, Default)]
pub struct ClusterStore {
    clusters: Vec<Cluster>,
}

impl ClusterStore {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self { clusters }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Wholesale replacement after a clustering run. Returns the previous
    /// list. Callers must re-run aggregation afterwards.
    pub fn replace(&mut self, clusters: Vec<Cluster>) -> Vec<Cluster> {
        info!(
            cluster_count = clusters.len(),
            replaced_count = self.clusters.len(),
            "Replacing cluster list"
        );
        std::mem::replace(&mut self.clusters, clusters)
    }

    /// Targeted edit of one cluster's fields, independent of re-clustering.
    /// The closure receives the live cluster.
    pub fn update<F>(&mut self, id: i64, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Cluster),
    {
        let cluster = self
            .clusters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::ClusterNotFound(id))?;
        edit(cluster);
        Ok(())
    }

    /// Ids of clusters containing the given page.
    pub fn clusters_for_page(&self, page_id: uuid::Uuid) -> Vec<i64> {
        self.clusters
            .iter()
            .filter(|c| c.page_ids.contains(&page_id))
            .map(|c| c.id)
            .collect()
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }
}
