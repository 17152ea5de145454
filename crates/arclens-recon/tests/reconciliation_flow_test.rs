//! End-to-end reconciliation flows through the project controller.

use arclens_core::{
    ArchivalPage, Cluster, Correspondent, EntityRef, EntityType, NamedEntities, RecordStatus,
};
use arclens_recon::ProjectController;

fn page(index_name: &str, people: &[&str]) -> ArchivalPage {
    let mut page = ArchivalPage::new(format!("{index_name}.jpg"), index_name);
    page.entities = Some(NamedEntities {
        people: people.iter().map(|n| EntityRef::new(*n)).collect(),
        ..Default::default()
    });
    page
}

fn cluster(id: i64, people: &[&str], senders: &[&str]) -> Cluster {
    Cluster {
        id,
        title: format!("Document {id}"),
        page_range: String::new(),
        summary: String::new(),
        page_ids: vec![],
        prison_name: None,
        doc_types: vec![],
        subjects: vec![],
        languages: vec![],
        original_date: None,
        standardized_date: None,
        senders: senders
            .iter()
            .map(|n| Correspondent {
                name: n.to_string(),
                role: None,
                id: None,
            })
            .collect(),
        recipients: vec![],
        entities: Some(NamedEntities {
            people: people.iter().map(|n| EntityRef::new(*n)).collect(),
            ..Default::default()
        }),
    }
}

#[test]
fn anna_cohen_mentions_collapse_to_one_pending_record() {
    // "Anna Cohen" on a page, "anna cohen" in a cluster's entities, and
    // "Anna Cohen" as a sender of the same cluster: one record, two
    // appearances, pending (no vocabulary entry exists).
    let mut project = ProjectController::new();
    project.add_pages(vec![page("p1", &["Anna Cohen"])]);
    project.replace_clusters(vec![cluster(7, &["anna cohen"], &["Anna Cohen"])]);
    project.resync();

    let records = project.record_list();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.status, RecordStatus::Pending);
    assert_eq!(record.source_appearances.len(), 2);
    let locations: Vec<&str> = record
        .source_appearances
        .iter()
        .map(|a| a.location_id.as_str())
        .collect();
    assert_eq!(locations, vec!["Doc #7", "p1"]);
}

#[test]
fn note_survives_resync_and_new_appearances_append() {
    let mut project = ProjectController::new();
    project.add_pages(vec![page("p1", &["Anna Cohen"])]);
    project.resync();
    let record_id = project.record_list()[0].id;
    project
        .set_appearance_note(record_id, "p1", "signature only, surname unclear")
        .unwrap();

    project.add_pages(vec![page("p2", &["ANNA COHEN"])]);
    project.resync();

    let records = project.record_list();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, record_id);
    assert_eq!(
        records[0].source_appearances[0].note,
        "signature only, surname unclear"
    );
    assert_eq!(records[0].source_appearances[1].location_id, "p2");
}

#[test]
fn match_promotion_applies_to_pending_but_not_rejected() {
    let mut project = ProjectController::new();
    project.add_pages(vec![
        page("p1", &["Rivka Stern"]),
        page("p2", &["Moshe Stern"]),
    ]);
    project.resync();

    let rejected_id = project
        .record_list()
        .iter()
        .find(|r| r.extracted_name == "Moshe Stern")
        .map(|r| r.id)
        .unwrap();
    project.reject(rejected_id).unwrap();

    // Both names enter the vocabulary, then a resync runs.
    project.add_authority("Rivka Stern", EntityType::Person);
    project.add_authority("Moshe Stern", EntityType::Person);
    project.resync();

    let pending_now_matched = project
        .record_list()
        .iter()
        .find(|r| r.extracted_name == "Rivka Stern")
        .unwrap();
    assert_eq!(pending_now_matched.status, RecordStatus::Matched);

    let still_rejected = project
        .record_list()
        .iter()
        .find(|r| r.extracted_name == "Moshe Stern")
        .unwrap();
    assert_eq!(still_rejected.status, RecordStatus::Rejected);
    assert!(still_rejected.matched_id.is_none());
}

#[test]
fn reclustering_preserves_user_state_for_surviving_keys() {
    let mut project = ProjectController::new();
    project.replace_clusters(vec![cluster(1, &["Anna Cohen", "Haganah Liaison"], &[])]);
    project.resync();

    let custom_id = project
        .record_list()
        .iter()
        .find(|r| r.extracted_name == "Haganah Liaison")
        .map(|r| r.id)
        .unwrap();
    project.promote_to_custom(custom_id).unwrap();

    // New clustering run splits the material differently but keeps both
    // names in play.
    project.replace_clusters(vec![
        cluster(10, &["Anna Cohen"], &[]),
        cluster(11, &["Haganah Liaison"], &[]),
    ]);
    project.resync();

    let custom = project
        .record_list()
        .iter()
        .find(|r| r.extracted_name == "Haganah Liaison")
        .unwrap();
    assert_eq!(custom.id, custom_id);
    assert_eq!(custom.status, RecordStatus::Custom);
    // Appearances carry over from the old clustering and the new location
    // is appended; aggregation never removes appearances.
    let locations: Vec<&str> = custom
        .source_appearances
        .iter()
        .map(|a| a.location_id.as_str())
        .collect();
    assert_eq!(locations, vec!["Doc #1", "Doc #11"]);
}

#[test]
fn record_disappears_when_no_source_mentions_remain() {
    let mut project = ProjectController::new();
    project.replace_clusters(vec![cluster(1, &["Anna Cohen"], &[])]);
    project.resync();
    assert_eq!(project.record_list().len(), 1);

    project.replace_clusters(vec![cluster(2, &["Someone Else"], &[])]);
    project.resync();

    assert!(project
        .record_list()
        .iter()
        .all(|r| r.extracted_name != "Anna Cohen"));
}

#[test]
fn rename_creates_new_key_on_next_pass() {
    let mut project = ProjectController::new();
    project.add_pages(vec![page("p1", &["Ana Cohen"])]);
    project.resync();
    let record_id = project.record_list()[0].id;

    // The rename changes the display form only; the source still says
    // "Ana Cohen", so the next pass re-groups under the source spelling
    // with a fresh record.
    project.rename_record(record_id, "Anna Cohen").unwrap();
    project.resync();

    let records = project.record_list();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].extracted_name, "Ana Cohen");
    assert_ne!(records[0].id, record_id);
}

#[test]
fn same_name_under_two_types_stays_two_records() {
    let mut project = ProjectController::new();
    let mut c = cluster(1, &[], &[]);
    let entities = c.entities.as_mut().unwrap();
    entities.people.push(EntityRef::new("Magen David"));
    entities.organizations.push(EntityRef::new("Magen David"));
    project.replace_clusters(vec![c]);
    project.resync();

    let records = project.record_list();
    assert_eq!(records.len(), 2);

    // Rejecting one does not touch the other.
    let org_id = records
        .iter()
        .find(|r| r.entity_type == EntityType::Organization)
        .map(|r| r.id)
        .unwrap();
    project.reject(org_id).unwrap();
    project.resync();

    let person = project
        .record_list()
        .iter()
        .find(|r| r.entity_type == EntityType::Person)
        .unwrap();
    assert_eq!(person.status, RecordStatus::Pending);
}

#[test]
fn seed_vocabulary_matches_on_first_sync() {
    let mut project = ProjectController::new();
    project.replace_clusters(vec![cluster(1, &["golda meir"], &["David Ben-Gurion"])]);
    project.resync();

    for record in project.record_list() {
        assert_eq!(record.status, RecordStatus::Matched, "{}", record.extracted_name);
        assert!(record.matched_id.is_some());
    }
}

#[test]
fn unlink_then_resync_rematches_from_vocabulary() {
    let mut project = ProjectController::new();
    project.add_pages(vec![page("p1", &["Golda Meir"])]);
    project.resync();
    let record_id = project.record_list()[0].id;
    assert_eq!(project.record_list()[0].status, RecordStatus::Matched);

    project.unlink(record_id).unwrap();
    assert_eq!(project.record_list()[0].status, RecordStatus::Pending);

    // Pending records re-resolve on the next pass; an unlink that should
    // stick needs a reject or custom status instead.
    project.resync();
    assert_eq!(project.record_list()[0].status, RecordStatus::Matched);
}

#[test]
fn cluster_edit_takes_effect_on_explicit_resync() {
    let mut project = ProjectController::new();
    project.replace_clusters(vec![cluster(1, &["Anna Cohen"], &[])]);
    project.resync();
    assert_eq!(project.record_list().len(), 1);

    project
        .update_cluster(1, |c| {
            c.entities
                .as_mut()
                .unwrap()
                .organizations
                .push(EntityRef::new("Va'ad Leumi"));
        })
        .unwrap();
    // Stale until resync.
    assert_eq!(project.record_list().len(), 1);

    project.resync();
    assert_eq!(project.record_list().len(), 2);
    let org = project
        .record_list()
        .iter()
        .find(|r| r.entity_type == EntityType::Organization)
        .unwrap();
    // Seeded authority, so it arrives matched.
    assert_eq!(org.status, RecordStatus::Matched);
}
