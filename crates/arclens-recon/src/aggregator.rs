//! The mention aggregator: collapses raw entity mentions from pages and
//! clusters into deduplicated reconciliation records.
//!
//! Aggregation is pure and idempotent. It groups mentions by
//! `(type, lowercased name)`, merges source locations, carries user-set
//! state over from the previous record list, and resolves still-pending
//! records against the current vocabulary snapshot. Re-running it with
//! unchanged inputs yields identical output, and user annotations survive
//! as long as the grouping key persists.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace};

use arclens_core::{
    ArchivalPage, AuthorityRecord, Cluster, EntityType, NamedEntities, ReconciliationRecord,
    RecordStatus,
};

use crate::matcher::resolve_entry;

/// Aggregate all entity mentions across `clusters` and `pages` into a new
/// reconciliation record list.
///
/// `previous` supplies carry-over state: record ids, statuses, `addedAt`
/// stamps, and per-location appearance notes persist across passes keyed
/// by `(type, lowercased name)`. Records whose key no longer occurs in the
/// sources are dropped from the output; aggregation itself never removes
/// appearances from a surviving record.
///
/// Pending records are re-resolved against `vocabulary` on every pass, so
/// authority entries added mid-project surface as matches on the next
/// sync. `Rejected` and `Custom` statuses are sticky until the user acts.
pub fn aggregate(
    pages: &[ArchivalPage],
    clusters: &[Cluster],
    previous: &[ReconciliationRecord],
    vocabulary: &[AuthorityRecord],
) -> Vec<ReconciliationRecord> {
    let started = Instant::now();

    let previous_by_key: HashMap<(EntityType, String), &ReconciliationRecord> =
        previous.iter().map(|r| (r.key(), r)).collect();

    let mut working: Vec<ReconciliationRecord> = Vec::new();
    let mut index: HashMap<(EntityType, String), usize> = HashMap::new();
    let mut mention_count = 0usize;

    let mut push_mention = |name: &str, entity_type: EntityType, location: &str| {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        mention_count += 1;
        let key = (entity_type, name.to_lowercase());

        if let Some(&slot) = index.get(&key) {
            working[slot].push_appearance(location);
            return;
        }

        let mut record = match previous_by_key.get(&key) {
            Some(prev) => {
                let mut carried = (*prev).clone();
                // Vocabulary growth surfaces new links automatically, but
                // only for records still awaiting review.
                if carried.status == RecordStatus::Pending {
                    if let Some(entry) = resolve_entry(name, vocabulary) {
                        trace!(
                            name = %name,
                            authority_id = entry.id,
                            "Promoting pending record to matched"
                        );
                        carried.set_match(entry.id, entry.name.clone());
                    }
                }
                carried
            }
            None => {
                let mut fresh = ReconciliationRecord::new(name, entity_type);
                if let Some(entry) = resolve_entry(name, vocabulary) {
                    fresh.set_match(entry.id, entry.name.clone());
                }
                fresh
            }
        };
        record.push_appearance(location);
        index.insert(key, working.len());
        working.push(record);
    };

    let empty = NamedEntities::default();

    // Clusters first: entity lists, then correspondents. Senders and
    // recipients share the cluster's location token with its entity
    // mentions, so a person appearing as both collapses to one appearance.
    for cluster in clusters {
        let location = cluster.location_token();
        let entities = cluster.entities.as_ref().unwrap_or(&empty);
        for e in &entities.people {
            push_mention(&e.name, EntityType::Person, &location);
        }
        for e in &entities.organizations {
            push_mention(&e.name, EntityType::Organization, &location);
        }
        for e in &entities.roles {
            push_mention(&e.name, EntityType::Role, &location);
        }
        for c in cluster.senders.iter().chain(cluster.recipients.iter()) {
            push_mention(&c.name, EntityType::Person, &location);
        }
    }

    // Pages second, located by index label (distinguishable from cluster
    // "Doc #" tokens by shape).
    for page in pages {
        let entities = page.entities.as_ref().unwrap_or(&empty);
        for e in &entities.people {
            push_mention(&e.name, EntityType::Person, &page.index_name);
        }
        for e in &entities.organizations {
            push_mention(&e.name, EntityType::Organization, &page.index_name);
        }
        for e in &entities.roles {
            push_mention(&e.name, EntityType::Role, &page.index_name);
        }
    }

    debug!(
        mention_count,
        record_count = working.len(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Aggregation pass complete"
    );

    working
}
