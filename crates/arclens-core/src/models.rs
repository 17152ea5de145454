//! Core data models for arclens.
//!
//! These types are shared across all arclens crates and represent the
//! project state: scanned pages, AI-derived clusters, the master vocabulary
//! of authority records, and the reconciliation records that tie free-text
//! entity mentions back to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// The kind of entity a mention or authority record describes.
///
/// Aggregation groups strictly by type: the same name under two types
/// yields two independent reconciliation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Organization,
    Role,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Organization => write!(f, "organization"),
            Self::Role => write!(f, "role"),
        }
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "person" => Ok(Self::Person),
            "organization" => Ok(Self::Organization),
            "role" => Ok(Self::Role),
            _ => Err(format!("Invalid entity type: {}", s)),
        }
    }
}

/// A name as extracted from source text, optionally resolved to an
/// authority identity. `id` absent means unresolved/free-text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

impl EntityRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

/// A sender or recipient on a cluster: an entity reference plus the role
/// the document assigns them ("Commandant", "Secretary", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
}

/// Entity lists extracted from one page or cluster.
///
/// Every list defaults to empty: upstream AI output with missing arrays is
/// tolerated, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntities {
    #[serde(default)]
    pub people: Vec<EntityRef>,
    #[serde(default)]
    pub organizations: Vec<EntityRef>,
    #[serde(default)]
    pub roles: Vec<EntityRef>,
}

// =============================================================================
// PAGE TYPES
// =============================================================================

/// Processing state of a single page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Pending,
    Analyzing,
    Analyzed,
    Transcribing,
    Done,
    Error,
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::Analyzed => write!(f, "analyzed"),
            Self::Transcribing => write!(f, "transcribing"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One scanned page of an archival document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivalPage {
    pub id: Uuid,
    /// Original filename on disk.
    pub file_name: String,
    /// Display label: folder/PDF name plus page position.
    pub index_name: String,

    // Analysis metadata (first AI pass)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_hebrew_handwriting: Option<bool>,

    // Researcher entry and selection flags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_description: Option<String>,
    #[serde(default)]
    pub should_transcribe: bool,
    #[serde(default)]
    pub should_translate: bool,
    #[serde(default)]
    pub should_download_image: bool,
    /// Rotation in degrees, multiples of 90.
    #[serde(default)]
    pub rotation: i32,

    // Transcription output (second AI pass)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_translation: Option<String>,
    /// Model self-reported confidence, 1-5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<u8>,

    #[serde(default)]
    pub status: PageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Entities extracted from this page, if any pass produced them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<NamedEntities>,
}

impl ArchivalPage {
    /// Create a freshly ingested page with no analysis data.
    pub fn new(file_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            index_name: index_name.into(),
            language: None,
            production_mode: None,
            has_hebrew_handwriting: None,
            manual_transcription: None,
            manual_description: None,
            should_transcribe: false,
            should_translate: false,
            should_download_image: false,
            rotation: 0,
            generated_transcription: None,
            generated_translation: None,
            confidence_score: None,
            status: PageStatus::Pending,
            error: None,
            entities: None,
        }
    }

    /// Best available transcription text: manual entry wins over generated.
    pub fn transcription_text(&self) -> &str {
        self.manual_transcription
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.generated_transcription.as_deref())
            .unwrap_or("")
    }
}

// =============================================================================
// CLUSTER TYPES
// =============================================================================

/// A logical multi-page document as grouped by the clustering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub page_range: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub page_ids: Vec<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prison_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_date: Option<String>,
    /// yyyy-mm-dd
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standardized_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub senders: Vec<Correspondent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<Correspondent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<NamedEntities>,
}

impl Cluster {
    /// The location token recorded on source appearances for mentions
    /// originating from this cluster. Distinguishable from page index
    /// labels by shape.
    pub fn location_token(&self) -> String {
        format!("Doc #{}", self.id)
    }
}

// =============================================================================
// AUTHORITY TYPES
// =============================================================================

/// A canonical, cross-project entity definition in the master vocabulary.
///
/// Identities are stable: assigned at creation, never reused, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityRecord {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    // Biographical fields, all independently mutable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_span: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub religion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_links: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AuthorityRecord {
    pub fn new(id: u32, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id,
            name: name.into(),
            entity_type,
            life_span: None,
            affiliation: None,
            religion: None,
            nationality: None,
            gender: None,
            alias_names: Vec::new(),
            external_links: None,
            notes: None,
        }
    }
}

// =============================================================================
// RECONCILIATION TYPES
// =============================================================================

/// One location where an entity mention was found, plus an optional
/// researcher note. Notes are keyed by `location_id`, not position, so
/// they survive re-aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAppearance {
    pub location_id: String,
    #[serde(default)]
    pub note: String,
}

impl SourceAppearance {
    pub fn new(location_id: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            note: String::new(),
        }
    }
}

/// Review state of a reconciliation record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Awaiting review, no authority link.
    #[default]
    Pending,
    /// Linked to a master vocabulary entry.
    Matched,
    /// Explicitly marked as not an entity worth tracking.
    Rejected,
    /// Kept in the project index without a master-authority link.
    Custom,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Matched => write!(f, "matched"),
            Self::Rejected => write!(f, "rejected"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// A project-scoped deduplicated group of raw entity mentions, optionally
/// linked to an authority record.
///
/// `status == Matched` iff `matched_id` is set; use [`Self::set_match`] and
/// [`Self::clear_match`] to keep the two in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRecord {
    pub id: Uuid,
    pub extracted_name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_id: Option<u32>,
    /// Vocabulary name snapshot at match time. Deliberately denormalized:
    /// a later vocabulary rename does not retroactively alter export rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub source_appearances: Vec<SourceAppearance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl ReconciliationRecord {
    /// Create a fresh pending record with a newly minted identity.
    pub fn new(extracted_name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: Uuid::new_v4(),
            extracted_name: extracted_name.into(),
            entity_type,
            matched_id: None,
            matched_name: None,
            status: RecordStatus::Pending,
            source_appearances: Vec::new(),
            added_at: None,
        }
    }

    /// The aggregation grouping key: (type, lowercased extracted name).
    pub fn key(&self) -> (EntityType, String) {
        (self.entity_type, self.extracted_name.to_lowercase())
    }

    /// Append a source appearance unless that location is already recorded.
    pub fn push_appearance(&mut self, location_id: &str) {
        if !self
            .source_appearances
            .iter()
            .any(|a| a.location_id == location_id)
        {
            self.source_appearances
                .push(SourceAppearance::new(location_id));
        }
    }

    /// Link this record to an authority entry, atomically with the status.
    pub fn set_match(&mut self, authority_id: u32, authority_name: impl Into<String>) {
        self.matched_id = Some(authority_id);
        self.matched_name = Some(authority_name.into());
        self.status = RecordStatus::Matched;
    }

    /// Drop any authority link, atomically with the status.
    pub fn clear_match(&mut self, status: RecordStatus) {
        debug_assert!(status != RecordStatus::Matched);
        self.matched_id = None;
        self.matched_name = None;
        self.status = status;
    }
}

// =============================================================================
// PROJECT STATE
// =============================================================================

/// Resource tier for external AI calls. Selects batch concurrency and the
/// clustering model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    #[default]
    Free,
    Paid,
}

impl Tier {
    /// Concurrent page-analysis calls in flight.
    pub fn analysis_concurrency(&self) -> usize {
        match self {
            Self::Free => crate::defaults::FREE_ANALYSIS_CONCURRENCY,
            Self::Paid => crate::defaults::PAID_CONCURRENCY,
        }
    }

    /// Concurrent transcription calls in flight.
    pub fn transcription_concurrency(&self) -> usize {
        match self {
            Self::Free => crate::defaults::FREE_TRANSCRIPTION_CONCURRENCY,
            Self::Paid => crate::defaults::PAID_CONCURRENCY,
        }
    }

    /// Preferred model for the clustering pass.
    pub fn clustering_model(&self) -> &'static str {
        match self {
            Self::Free => crate::defaults::FLASH_MODEL,
            Self::Paid => crate::defaults::PRO_MODEL,
        }
    }
}

/// The serializable project state: exactly the four collections the
/// backup/restore contract persists, with no derived or cached fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub files: Vec<ArchivalPage>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub reconciliation_list: Vec<ReconciliationRecord>,
    #[serde(default)]
    pub master_vocabulary: Vec<AuthorityRecord>,
    #[serde(default)]
    pub tier: Tier,
}

/// Backup envelope metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    #[serde(rename = "type")]
    pub backup_type: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub project_title: String,
    #[serde(default)]
    pub archive_name: String,
}

/// The full backup document written to the opaque blob sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBackup {
    pub meta: BackupMeta,
    pub app_state: AppState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_display_and_parse() {
        for (t, s) in [
            (EntityType::Person, "person"),
            (EntityType::Organization, "organization"),
            (EntityType::Role, "role"),
        ] {
            assert_eq!(t.to_string(), s);
            assert_eq!(s.parse::<EntityType>().unwrap(), t);
        }
        assert!("place".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_named_entities_tolerates_missing_arrays() {
        let entities: NamedEntities = serde_json::from_str(r#"{"people":[{"name":"A"}]}"#).unwrap();
        assert_eq!(entities.people.len(), 1);
        assert!(entities.organizations.is_empty());
        assert!(entities.roles.is_empty());
    }

    #[test]
    fn test_cluster_location_token() {
        let cluster = Cluster {
            id: 7,
            title: "Letter".into(),
            page_range: String::new(),
            summary: String::new(),
            page_ids: vec![],
            prison_name: None,
            doc_types: vec![],
            subjects: vec![],
            languages: vec![],
            original_date: None,
            standardized_date: None,
            senders: vec![],
            recipients: vec![],
            entities: None,
        };
        assert_eq!(cluster.location_token(), "Doc #7");
    }

    #[test]
    fn test_record_key_is_case_insensitive() {
        let a = ReconciliationRecord::new("Anna Cohen", EntityType::Person);
        let b = ReconciliationRecord::new("anna cohen", EntityType::Person);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_record_key_separates_types() {
        let a = ReconciliationRecord::new("Magen David", EntityType::Person);
        let b = ReconciliationRecord::new("Magen David", EntityType::Organization);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_push_appearance_dedupes_by_location() {
        let mut record = ReconciliationRecord::new("Anna Cohen", EntityType::Person);
        record.push_appearance("Doc #7");
        record.push_appearance("Doc #7");
        record.push_appearance("p1");
        assert_eq!(record.source_appearances.len(), 2);
    }

    #[test]
    fn test_set_and_clear_match_atomic() {
        let mut record = ReconciliationRecord::new("Anna Cohen", EntityType::Person);
        record.set_match(3, "Anna Cohen");
        assert_eq!(record.status, RecordStatus::Matched);
        assert_eq!(record.matched_id, Some(3));
        assert_eq!(record.matched_name.as_deref(), Some("Anna Cohen"));

        record.clear_match(RecordStatus::Pending);
        assert_eq!(record.status, RecordStatus::Pending);
        assert!(record.matched_id.is_none());
        assert!(record.matched_name.is_none());
    }

    #[test]
    fn test_page_transcription_text_fallback() {
        let mut page = ArchivalPage::new("scan_001.jpg", "Folder - scan_001.jpg");
        assert_eq!(page.transcription_text(), "");
        page.generated_transcription = Some("generated".into());
        assert_eq!(page.transcription_text(), "generated");
        page.manual_transcription = Some("manual".into());
        assert_eq!(page.transcription_text(), "manual");
        page.manual_transcription = Some(String::new());
        assert_eq!(page.transcription_text(), "generated");
    }

    #[test]
    fn test_reconciliation_record_serde_field_names() {
        let mut record = ReconciliationRecord::new("Anna Cohen", EntityType::Person);
        record.set_match(3, "Anna Cohen");
        record.push_appearance("p1");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["extractedName"], "Anna Cohen");
        assert_eq!(json["type"], "person");
        assert_eq!(json["matchedId"], 3);
        assert_eq!(json["status"], "matched");
        assert_eq!(json["sourceAppearances"][0]["locationId"], "p1");
    }

    #[test]
    fn test_tier_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Tier::Free).unwrap(), "\"FREE\"");
        assert_eq!(
            serde_json::from_str::<Tier>("\"PAID\"").unwrap(),
            Tier::Paid
        );
    }

    #[test]
    fn test_app_state_round_trip() {
        let mut state = AppState::default();
        state.files.push(ArchivalPage::new("a.jpg", "Box 1 - a.jpg"));
        state
            .master_vocabulary
            .push(AuthorityRecord::new(1, "Golda Meir", EntityType::Person));
        let mut record = ReconciliationRecord::new("Golda Meir", EntityType::Person);
        record.push_appearance("Box 1 - a.jpg");
        state.reconciliation_list.push(record);

        let json = serde_json::to_string(&state).unwrap();
        let restored: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.files.len(), 1);
        assert_eq!(restored.master_vocabulary, state.master_vocabulary);
        assert_eq!(restored.reconciliation_list, state.reconciliation_list);
    }
}
