//! Backend traits for the three external AI passes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use arclens_core::{ArchivalPage, AuthorityRecord, Cluster, Result, Tier};

/// First-pass analysis output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub language: String,
    pub production_mode: String,
    pub has_hebrew_handwriting: bool,
}

/// Second-pass transcription output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTranscription {
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub translation: String,
    /// Model self-reported confidence, 1-5.
    #[serde(default = "default_confidence")]
    pub confidence_score: u8,
}

fn default_confidence() -> u8 {
    3
}

/// The per-page payload handed to the clustering pass: identity plus the
/// best transcription text, truncated to the clustering prompt budget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDigest {
    pub id: uuid::Uuid,
    pub index_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub transcription: String,
}

impl PageDigest {
    /// Build a digest from a page, preferring manual transcription and
    /// truncating on a char boundary.
    pub fn from_page(page: &ArchivalPage, limit: usize) -> Self {
        let text = page.transcription_text();
        let transcription = if text.chars().count() > limit {
            text.chars().take(limit).collect()
        } else {
            text.to_string()
        };
        Self {
            id: page.id,
            index_name: page.index_name.clone(),
            language: page.language.clone(),
            transcription,
        }
    }
}

/// Backend for the language/production-mode analysis pass.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    /// Analyze one page image.
    async fn analyze_page(&self, image_data: &[u8], mime_type: &str) -> Result<PageAnalysis>;

    /// The model name used for this pass.
    fn model_name(&self) -> &str;
}

/// Backend for the transcription/translation pass.
#[async_trait]
pub trait PageTranscriber: Send + Sync {
    /// Transcribe one page image, optionally translating to English.
    async fn transcribe_page(
        &self,
        image_data: &[u8],
        mime_type: &str,
        translate: bool,
    ) -> Result<PageTranscription>;
}

/// Backend for the clustering-and-extraction pass.
#[async_trait]
pub trait ClusterOracle: Send + Sync {
    /// Group page digests into clusters and extract entities per cluster.
    ///
    /// Implementations annotate extracted names with authority ids where
    /// the vocabulary resolves them; unresolved names stay free-text.
    async fn cluster_pages(
        &self,
        digests: &[PageDigest],
        vocabulary: &[AuthorityRecord],
        tier: Tier,
    ) -> Result<Vec<Cluster>>;
}
