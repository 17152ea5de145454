//! Mock oracle for deterministic testing.
//!
//! Implements all three backend traits with configurable canned output,
//! simulated latency, and failure injection, plus a call log and an
//! in-flight high-water mark for asserting concurrency behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use arclens_core::{AuthorityRecord, Cluster, Error, Result, Tier};

use crate::oracle::{
    ClusterOracle, PageAnalysis, PageAnalyzer, PageDigest, PageTranscriber, PageTranscription,
};

/// Mock inference oracle for testing.
#[derive(Clone)]
pub struct MockOracle {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
    last_digests: Arc<Mutex<Vec<PageDigest>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    analysis: PageAnalysis,
    transcription: PageTranscription,
    clusters: Vec<Cluster>,
    latency_ms: u64,
    failure_rate: f64,
    failing_inputs: Vec<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            analysis: PageAnalysis {
                language: "English".to_string(),
                production_mode: "typewriting".to_string(),
                has_hebrew_handwriting: false,
            },
            transcription: PageTranscription {
                transcription: "Mock transcription".to_string(),
                translation: String::new(),
                confidence_score: 3,
            },
            clusters: Vec::new(),
            latency_ms: 0,
            failure_rate: 0.0,
            failing_inputs: Vec::new(),
        }
    }
}

impl MockOracle {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
            last_digests: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the canned analysis result.
    pub fn with_analysis(mut self, analysis: PageAnalysis) -> Self {
        Arc::make_mut(&mut self.config).analysis = analysis;
        self
    }

    /// Set the canned transcription result.
    pub fn with_transcription(mut self, transcription: PageTranscription) -> Self {
        Arc::make_mut(&mut self.config).transcription = transcription;
        self
    }

    /// Set the canned clustering result.
    pub fn with_clusters(mut self, clusters: Vec<Cluster>) -> Self {
        Arc::make_mut(&mut self.config).clusters = clusters;
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Fail deterministically whenever this exact image payload is seen.
    pub fn with_failing_input(mut self, data: &[u8]) -> Self {
        Arc::make_mut(&mut self.config)
            .failing_inputs
            .push(data.to_vec());
        self
    }

    /// All logged calls, for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn analysis_call_count(&self) -> usize {
        self.count_calls("analyze")
    }

    pub fn transcription_call_count(&self) -> usize {
        self.count_calls("transcribe")
    }

    pub fn cluster_call_count(&self) -> usize {
        self.count_calls("cluster")
    }

    /// Highest number of operations ever in flight simultaneously.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// The digests passed to the most recent clustering call.
    pub fn last_cluster_digests(&self) -> Vec<PageDigest> {
        self.last_digests.lock().unwrap().clone()
    }

    fn count_calls(&self, operation: &str) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn log_call(&self, operation: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            timestamp: std::time::Instant::now(),
        });
    }

    fn should_fail(&self, image_data: &[u8]) -> bool {
        if self
            .config
            .failing_inputs
            .iter()
            .any(|input| input == image_data)
        {
            return true;
        }
        if self.config.failure_rate > 0.0 {
            use rand::Rng;
            return rand::thread_rng().gen::<f64>() < self.config.failure_rate;
        }
        false
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageAnalyzer for MockOracle {
    async fn analyze_page(&self, image_data: &[u8], _mime_type: &str) -> Result<PageAnalysis> {
        self.log_call("analyze");
        self.enter().await;
        let result = if self.should_fail(image_data) {
            Err(Error::Inference("Simulated analysis failure".to_string()))
        } else {
            Ok(self.config.analysis.clone())
        };
        self.exit();
        result
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[async_trait]
impl PageTranscriber for MockOracle {
    async fn transcribe_page(
        &self,
        image_data: &[u8],
        _mime_type: &str,
        translate: bool,
    ) -> Result<PageTranscription> {
        self.log_call("transcribe");
        self.enter().await;
        let result = if self.should_fail(image_data) {
            Err(Error::Inference(
                "Simulated transcription failure".to_string(),
            ))
        } else {
            let mut transcription = self.config.transcription.clone();
            if !translate {
                transcription.translation = String::new();
            }
            Ok(transcription)
        };
        self.exit();
        result
    }
}

#[async_trait]
impl ClusterOracle for MockOracle {
    async fn cluster_pages(
        &self,
        digests: &[PageDigest],
        _vocabulary: &[AuthorityRecord],
        _tier: Tier,
    ) -> Result<Vec<Cluster>> {
        self.log_call("cluster");
        *self.last_digests.lock().unwrap() = digests.to_vec();
        self.enter().await;
        let result = if self.config.failure_rate >= 1.0 {
            Err(Error::Inference("Simulated clustering failure".to_string()))
        } else {
            Ok(self.config.clusters.clone())
        };
        self.exit();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_configured_analysis() {
        let oracle = MockOracle::new().with_analysis(PageAnalysis {
            language: "Hebrew".to_string(),
            production_mode: "handwriting".to_string(),
            has_hebrew_handwriting: true,
        });

        let analysis = oracle.analyze_page(b"img", "image/jpeg").await.unwrap();
        assert_eq!(analysis.language, "Hebrew");
        assert!(analysis.has_hebrew_handwriting);
        assert_eq!(oracle.analysis_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_failing_input_is_deterministic() {
        let oracle = MockOracle::new().with_failing_input(b"broken");
        assert!(oracle.analyze_page(b"broken", "image/jpeg").await.is_err());
        assert!(oracle.analyze_page(b"fine", "image/jpeg").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_translation_gated_by_flag() {
        let oracle = MockOracle::new().with_transcription(PageTranscription {
            transcription: "text".to_string(),
            translation: "translated".to_string(),
            confidence_score: 4,
        });

        let with = oracle
            .transcribe_page(b"img", "image/jpeg", true)
            .await
            .unwrap();
        assert_eq!(with.translation, "translated");

        let without = oracle
            .transcribe_page(b"img", "image/jpeg", false)
            .await
            .unwrap();
        assert_eq!(without.translation, "");
    }

    #[tokio::test]
    async fn test_mock_full_failure_rate_fails_clustering() {
        let oracle = MockOracle::new().with_failure_rate(1.0);
        let result = oracle.cluster_pages(&[], &[], Tier::Free).await;
        assert!(result.is_err());
    }
}
