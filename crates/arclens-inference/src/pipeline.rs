//! Bounded-concurrency batch drivers for the per-page AI passes.
//!
//! Each page is an independent work item: failures are captured per item
//! and never abort in-flight siblings. Concurrency limits come from the
//! project tier.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use arclens_core::defaults::CLUSTERING_TRANSCRIPTION_LIMIT;
use arclens_core::{ArchivalPage, AuthorityRecord, Cluster, PageStatus, Result, Tier};

use crate::oracle::{
    ClusterOracle, PageAnalysis, PageAnalyzer, PageDigest, PageTranscriber, PageTranscription,
};

/// Image bytes for one page, ready to send.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub page_id: Uuid,
    pub data: Vec<u8>,
    pub mime_type: String,
    /// Whether the transcription pass should also translate. Ignored by
    /// analysis.
    pub translate: bool,
}

/// Per-item result of a batch pass, in input order.
#[derive(Debug)]
pub struct PageOutcome<T> {
    pub page_id: Uuid,
    pub result: Result<T>,
}

/// Run the analysis pass over a batch of page images.
pub async fn analyze_pages(
    analyzer: &dyn PageAnalyzer,
    images: Vec<ImagePart>,
    tier: Tier,
) -> Vec<PageOutcome<PageAnalysis>> {
    let concurrency = tier.analysis_concurrency();
    info!(
        page_count = images.len(),
        concurrency,
        model = analyzer.model_name(),
        "Starting analysis batch"
    );

    let outcomes: Vec<_> = stream::iter(images)
        .map(|image| async move {
            let result = analyzer.analyze_page(&image.data, &image.mime_type).await;
            if let Err(e) = &result {
                debug!(page_id = %image.page_id, error = %e, "Page analysis failed");
            }
            PageOutcome {
                page_id: image.page_id,
                result,
            }
        })
        .buffered(concurrency)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        page_count = outcomes.len(),
        failed, "Analysis batch complete"
    );
    outcomes
}

/// Run the transcription pass over a batch of page images.
pub async fn transcribe_pages(
    transcriber: &dyn PageTranscriber,
    images: Vec<ImagePart>,
    tier: Tier,
) -> Vec<PageOutcome<PageTranscription>> {
    let concurrency = tier.transcription_concurrency();
    info!(
        page_count = images.len(),
        concurrency, "Starting transcription batch"
    );

    let outcomes: Vec<_> = stream::iter(images)
        .map(|image| async move {
            let result = transcriber
                .transcribe_page(&image.data, &image.mime_type, image.translate)
                .await;
            if let Err(e) = &result {
                debug!(page_id = %image.page_id, error = %e, "Page transcription failed");
            }
            PageOutcome {
                page_id: image.page_id,
                result,
            }
        })
        .buffered(concurrency)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        page_count = outcomes.len(),
        failed, "Transcription batch complete"
    );
    outcomes
}

/// Apply analysis outcomes back onto the page list: successful pages get
/// their metadata and an `Analyzed` status, failed pages get `Error` and
/// keep whatever data they had.
pub fn apply_analysis(pages: &mut [ArchivalPage], outcomes: Vec<PageOutcome<PageAnalysis>>) {
    for outcome in outcomes {
        let Some(page) = pages.iter_mut().find(|p| p.id == outcome.page_id) else {
            continue;
        };
        match outcome.result {
            Ok(analysis) => {
                page.language = Some(analysis.language);
                page.production_mode = Some(analysis.production_mode);
                page.has_hebrew_handwriting = Some(analysis.has_hebrew_handwriting);
                page.status = PageStatus::Analyzed;
                page.error = None;
            }
            Err(e) => {
                page.status = PageStatus::Error;
                page.error = Some(e.to_string());
            }
        }
    }
}

/// Apply transcription outcomes back onto the page list.
pub fn apply_transcription(
    pages: &mut [ArchivalPage],
    outcomes: Vec<PageOutcome<PageTranscription>>,
) {
    for outcome in outcomes {
        let Some(page) = pages.iter_mut().find(|p| p.id == outcome.page_id) else {
            continue;
        };
        match outcome.result {
            Ok(transcription) => {
                page.generated_transcription = Some(transcription.transcription);
                page.generated_translation = Some(transcription.translation);
                page.confidence_score = Some(transcription.confidence_score);
                page.status = PageStatus::Done;
                page.error = None;
            }
            Err(e) => {
                page.status = PageStatus::Error;
                page.error = Some(e.to_string());
            }
        }
    }
}

/// Run the clustering pass over the whole page set.
///
/// Transcriptions are truncated to the clustering prompt budget; the
/// resulting cluster list is intended to wholesale-replace the current
/// one, followed by an explicit reconciliation re-sync.
pub async fn run_clustering(
    oracle: &dyn ClusterOracle,
    pages: &[ArchivalPage],
    vocabulary: &[AuthorityRecord],
    tier: Tier,
) -> Result<Vec<Cluster>> {
    let digests: Vec<PageDigest> = pages
        .iter()
        .map(|p| PageDigest::from_page(p, CLUSTERING_TRANSCRIPTION_LIMIT))
        .collect();
    let clusters = oracle.cluster_pages(&digests, vocabulary, tier).await?;
    info!(
        page_count = pages.len(),
        cluster_count = clusters.len(),
        "Clustering complete"
    );
    Ok(clusters)
}
