//! JSON export and the backup/restore envelope.

use chrono::Utc;
use serde_json::json;
use tracing::info;

use arclens_core::{AppState, ArchivalPage, BackupMeta, Cluster, Error, ProjectBackup, Result, Tier};

/// Marker identifying a backup document as ours.
pub const BACKUP_TYPE: &str = "ARCHIVAL_LENS_BACKUP";

/// Current backup envelope version.
pub const BACKUP_VERSION: u32 = 1;

/// Full-project interchange JSON: pages flattened to their catalog
/// fields, clusters verbatim, plus export metadata.
pub fn full_json(
    project_title: &str,
    archive_name: &str,
    tier: Tier,
    pages: &[ArchivalPage],
    clusters: &[Cluster],
) -> Result<String> {
    let page_entries: Vec<_> = pages
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "indexName": p.index_name,
                "fileName": p.file_name,
                "rotation": p.rotation,
                "language": p.language,
                "productionMode": p.production_mode,
                "hasHebrewHandwriting": p.has_hebrew_handwriting,
                "transcription": p.transcription_text(),
                "translation": p.generated_translation,
                "description": p.manual_description,
            })
        })
        .collect();

    let document = json!({
        "projectTitle": project_title,
        "archiveName": archive_name,
        "tier": tier,
        "exportedAt": Utc::now(),
        "stats": {
            "totalPages": pages.len(),
            "totalClusters": clusters.len(),
        },
        "pages": page_entries,
        "clusters": clusters,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Serialize the whole project state into a restorable backup document.
pub fn backup_json(
    state: &AppState,
    project_title: &str,
    archive_name: &str,
) -> Result<String> {
    let backup = ProjectBackup {
        meta: BackupMeta {
            backup_type: BACKUP_TYPE.to_string(),
            version: BACKUP_VERSION,
            created_at: Utc::now(),
            project_title: project_title.to_string(),
            archive_name: archive_name.to_string(),
        },
        app_state: state.clone(),
    };
    info!(
        page_count = state.files.len(),
        cluster_count = state.clusters.len(),
        record_count = state.reconciliation_list.len(),
        "Writing project backup"
    );
    Ok(serde_json::to_string_pretty(&backup)?)
}

/// Parse and validate a backup document.
pub fn restore_backup(raw: &str) -> Result<ProjectBackup> {
    let backup: ProjectBackup = serde_json::from_str(raw)?;
    if backup.meta.backup_type != BACKUP_TYPE {
        return Err(Error::InvalidInput(format!(
            "Not a project backup: type is '{}'",
            backup.meta.backup_type
        )));
    }
    if backup.meta.version > BACKUP_VERSION {
        return Err(Error::InvalidInput(format!(
            "Backup version {} is newer than supported version {}",
            backup.meta.version, BACKUP_VERSION
        )));
    }
    info!(
        project_title = %backup.meta.project_title,
        page_count = backup.app_state.files.len(),
        "Restored project backup"
    );
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arclens_core::{EntityType, ReconciliationRecord};

    fn sample_state() -> AppState {
        let mut page = ArchivalPage::new("scan_001.jpg", "Acre 1/1");
        page.language = Some("Hebrew".into());
        let record = ReconciliationRecord::new("Anna Cohen", EntityType::Person);
        AppState {
            files: vec![page],
            clusters: vec![],
            reconciliation_list: vec![record],
            master_vocabulary: arclens_core::defaults::seed_vocabulary(),
            tier: Tier::Paid,
        }
    }

    #[test]
    fn test_backup_round_trip_is_lossless() {
        let state = sample_state();
        let raw = backup_json(&state, "Acre Letters", "Prisons Archive").unwrap();
        let restored = restore_backup(&raw).unwrap();

        assert_eq!(restored.meta.project_title, "Acre Letters");
        assert_eq!(restored.app_state.files.len(), 1);
        assert_eq!(
            restored.app_state.reconciliation_list,
            state.reconciliation_list
        );
        assert_eq!(
            restored.app_state.master_vocabulary,
            state.master_vocabulary
        );
        assert_eq!(restored.app_state.tier, Tier::Paid);
    }

    #[test]
    fn test_backup_uses_contract_field_names() {
        let raw = backup_json(&sample_state(), "T", "A").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["meta"]["type"], BACKUP_TYPE);
        assert_eq!(value["meta"]["version"], 1);
        assert!(value["appState"]["files"].is_array());
        assert!(value["appState"]["reconciliationList"].is_array());
        assert!(value["appState"]["masterVocabulary"].is_array());
        assert_eq!(value["appState"]["tier"], "PAID");
    }

    #[test]
    fn test_restore_rejects_foreign_document() {
        let raw = r#"{
            "meta": {"type": "SOMETHING_ELSE", "version": 1,
                     "createdAt": "2024-01-01T00:00:00Z",
                     "projectTitle": "X", "archiveName": ""},
            "appState": {}
        }"#;
        let err = restore_backup(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_restore_rejects_newer_version() {
        let raw = r#"{
            "meta": {"type": "ARCHIVAL_LENS_BACKUP", "version": 99,
                     "createdAt": "2024-01-01T00:00:00Z",
                     "projectTitle": "X", "archiveName": ""},
            "appState": {}
        }"#;
        let err = restore_backup(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_full_json_includes_stats_and_best_transcription() {
        let mut page = ArchivalPage::new("scan_001.jpg", "Acre 1/1");
        page.generated_transcription = Some("generated".into());
        page.manual_transcription = Some("manual".into());

        let raw = full_json("T", "A", Tier::Free, &[page], &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["stats"]["totalPages"], 1);
        assert_eq!(value["stats"]["totalClusters"], 0);
        assert_eq!(value["pages"][0]["transcription"], "manual");
        assert_eq!(value["tier"], "FREE");
    }
}
