//! Gemini REST backend implementing all three oracle traits.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use arclens_core::defaults::{
    API_BASE_URL, ENV_API_KEY, FLASH_MODEL, INFERENCE_TIMEOUT_SECS, PRO_MODEL,
};
use arclens_core::{
    AuthorityRecord, Cluster, Correspondent, EntityRef, Error, NamedEntities, Result, Tier,
};

use crate::oracle::{
    ClusterOracle, PageAnalysis, PageAnalyzer, PageDigest, PageTranscriber, PageTranscription,
};
use crate::repair::{parse_transcription_json, repair_truncated_json, salvage_json_list};
use crate::retry::with_rate_limit_retry;

/// Character budget for the vocabulary summary embedded in the clustering
/// prompt.
const VOCAB_PROMPT_LIMIT: usize = 40_000;

/// Known detention sites offered to the clustering model for the
/// `prisonName` field.
const PRISON_LIST: &[&str] = &[
    "Abu Kabir Lock-up",
    "Athlit Clearance Camp",
    "Athlit Detention Camp",
    "Bethlehem Detention Camp (Villa Salem)",
    "Boys' Reformatory School, Bethlehem",
    "Boys' Reformatory School, Rishon",
    "Boys' Reformatory School, Tulkarem",
    "Boys' Remand Home Jerusalem",
    "Carthaga Detention Camp, Sudan",
    "Central Prison Nablus",
    "Central Prison, Acre",
    "Central Prison, Jerusalem",
    "Cyprus detention camp",
    "Gilgil Detention Camp, Kenya",
    "Girls' Home",
    "Haifa Lock-up",
    "Jaffa Lock-up",
    "Jail Labour Co. No. 1 Nur Esh Shams",
    "Jail Labour Co. No. 2, Athlit",
    "Jenin Lock-up",
    "Jerusalem Lock-up",
    "Latrun Detention Camp",
    "Mazra'a Detention Camp",
    "Nablus Prison",
    "Other Prisons",
    "Qulqilya Lock-up",
    "Rafah Detention Camp",
    "Ramleh Lock-up",
    "Sarafand Detention Camp",
    "Sarona Internment Camp",
    "Sembel Detention Camp, Asmara, Eritrea",
    "Tel Aviv Lock-up",
    "Tulkarem Lock-up",
    "Unknown",
    "Wilhelma-Hamidije Internment Camp",
    "Women's Prison, Bethlehem",
];

/// Gemini-backed analysis, transcription, and clustering.
pub struct GeminiBackend {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            timeout_secs: INFERENCE_TIMEOUT_SECS,
        }
    }

    /// Create from environment variables. Returns None if no API key is
    /// configured.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(ENV_API_KEY).ok()?;
        if api_key.is_empty() {
            return None;
        }
        let base_url =
            std::env::var("ARCLENS_API_BASE").unwrap_or_else(|_| API_BASE_URL.to_string());
        Some(Self::new(base_url, api_key))
    }

    /// One generateContent call, returning the concatenated text parts of
    /// the first candidate.
    async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Request(format!("Inference request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 || body.contains("RESOURCE_EXHAUSTED") {
                return Err(Error::RateLimited(format!(
                    "Model API returned {}: {}",
                    status, body
                )));
            }
            return Err(Error::Inference(format!(
                "Model API returned {}: {}",
                status, body
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse model response: {}", e)))?;

        let text: String = result
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        Ok(text)
    }

    async fn run_clustering_once(
        &self,
        model: &str,
        digests: &[PageDigest],
        vocabulary: &[AuthorityRecord],
    ) -> Result<Vec<Cluster>> {
        let mut vocab_summary = vocabulary
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join("|");
        if vocab_summary.len() > VOCAB_PROMPT_LIMIT {
            let cut = (0..=VOCAB_PROMPT_LIMIT)
                .rev()
                .find(|&i| vocab_summary.is_char_boundary(i))
                .unwrap_or(0);
            vocab_summary.truncate(cut);
        }

        let input_data = serde_json::to_string(digests)?;
        let prompt = format!(
            "TASK 1: CLUSTERING\n\
             Group these archival pages into logical discrete documents (Clusters).\n\
             A cluster MUST represent exactly ONE physical document.\n\
             SPLIT ON DATE CHANGE: Different dates mean different clusters.\n\n\
             TASK 2: ENTITY EXTRACTION\n\
             For EACH cluster, extract all People, Organizations, and Roles mentioned in the text.\n\
             THIS IS MANDATORY. Even if a name is not in the vocabulary, extract it.\n\n\
             REFERENCE VOCABULARY (Check against this first): [{vocab_summary}]\n\
             PRISON LIST: {prisons}\n\n\
             Input Data (Pages and Transcriptions):\n{input_data}\n\n\
             Return a JSON array of Clusters. Ensure the 'entities' field is fully \
             populated for every cluster.",
            prisons = PRISON_LIST.join("|"),
        );

        let text = with_rate_limit_retry("cluster_pages", || {
            self.generate(model, vec![Part::text(&prompt)])
        })
        .await?;

        let raw_clusters = salvage_json_list(&text);
        debug!(
            model,
            cluster_count = raw_clusters.len(),
            page_count = digests.len(),
            "Clustering response parsed"
        );

        let mut clusters = Vec::with_capacity(raw_clusters.len());
        for value in raw_clusters {
            match serde_json::from_value::<RawCluster>(value) {
                Ok(raw) => clusters.push(raw.into_cluster(vocabulary)),
                Err(e) => warn!(error = %e, "Skipping unparseable cluster object"),
            }
        }
        Ok(clusters)
    }
}

#[async_trait]
impl PageAnalyzer for GeminiBackend {
    async fn analyze_page(&self, image_data: &[u8], mime_type: &str) -> Result<PageAnalysis> {
        let image = Part::image(image_data, mime_type);
        let prompt = "Analyze this archival document page. \
                      1. Identify language(s). \
                      2. Identify production mode (print, photo, handwriting, typewriting). \
                      3. Check for Hebrew handwriting specifically. \
                      Return JSON with fields language, productionMode, hasHebrewHandwriting.";

        let text = with_rate_limit_retry("analyze_page", || {
            self.generate(FLASH_MODEL, vec![image.clone(), Part::text(prompt)])
        })
        .await?;

        let analysis: PageAnalysis = serde_json::from_str(&repair_truncated_json(&text))?;
        Ok(analysis)
    }

    fn model_name(&self) -> &str {
        FLASH_MODEL
    }
}

#[async_trait]
impl PageTranscriber for GeminiBackend {
    async fn transcribe_page(
        &self,
        image_data: &[u8],
        mime_type: &str,
        translate: bool,
    ) -> Result<PageTranscription> {
        let image = Part::image(image_data, mime_type);
        let mut prompt = "Transcribe this archival document exactly. Detect language, \
                          preserve layout, and score confidence 1-5. Return JSON with \
                          fields transcription, translation, confidenceScore."
            .to_string();
        if translate {
            prompt.push_str(" Provide an English translation in the translation field.");
        }

        let text = with_rate_limit_retry("transcribe_page", || {
            self.generate(FLASH_MODEL, vec![image.clone(), Part::text(&prompt)])
        })
        .await?;

        parse_transcription_json(&text)
    }
}

#[async_trait]
impl ClusterOracle for GeminiBackend {
    async fn cluster_pages(
        &self,
        digests: &[PageDigest],
        vocabulary: &[AuthorityRecord],
        tier: Tier,
    ) -> Result<Vec<Cluster>> {
        let model = tier.clustering_model();
        match self.run_clustering_once(model, digests, vocabulary).await {
            Ok(clusters) => Ok(clusters),
            Err(e) if model == PRO_MODEL => {
                warn!(error = %e, "Pro clustering failed, falling back to flash");
                self.run_clustering_once(FLASH_MODEL, digests, vocabulary)
                    .await
            }
            Err(e) => Err(e),
        }
    }
}

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Clone, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(data: &[u8], mime_type: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(data),
            }),
        }
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Default, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Cluster shape as the model emits it: entity lists are plain name
/// strings, annotated with authority ids after parsing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCluster {
    id: i64,
    title: String,
    #[serde(default)]
    page_range: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    page_ids: Vec<Uuid>,
    #[serde(default)]
    prison_name: Option<String>,
    #[serde(default)]
    doc_types: Vec<String>,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    original_date: Option<String>,
    #[serde(default)]
    standardized_date: Option<String>,
    #[serde(default)]
    senders: Vec<RawCorrespondent>,
    #[serde(default)]
    recipients: Vec<RawCorrespondent>,
    #[serde(default)]
    entities: RawEntities,
}

#[derive(Deserialize)]
struct RawCorrespondent {
    name: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Default, Deserialize)]
struct RawEntities {
    #[serde(default)]
    people: Vec<String>,
    #[serde(default)]
    organizations: Vec<String>,
    #[serde(default)]
    roles: Vec<String>,
}

fn resolve_id(name: &str, vocabulary: &[AuthorityRecord]) -> Option<u32> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    vocabulary
        .iter()
        .find(|a| a.name.to_lowercase() == needle)
        .map(|a| a.id)
}

impl RawCluster {
    fn into_cluster(self, vocabulary: &[AuthorityRecord]) -> Cluster {
        let annotate = |names: Vec<String>| -> Vec<EntityRef> {
            names
                .into_iter()
                .map(|name| EntityRef {
                    id: resolve_id(&name, vocabulary),
                    name,
                })
                .collect()
        };
        let correspondents = |raw: Vec<RawCorrespondent>| -> Vec<Correspondent> {
            raw.into_iter()
                .map(|c| Correspondent {
                    id: resolve_id(&c.name, vocabulary),
                    name: c.name,
                    role: c.role,
                })
                .collect()
        };
        Cluster {
            id: self.id,
            title: self.title,
            page_range: self.page_range,
            summary: self.summary,
            page_ids: self.page_ids,
            prison_name: self.prison_name,
            doc_types: self.doc_types,
            subjects: self.subjects,
            languages: self.languages,
            original_date: self.original_date,
            standardized_date: self.standardized_date,
            senders: correspondents(self.senders),
            recipients: correspondents(self.recipients),
            entities: Some(NamedEntities {
                people: annotate(self.entities.people),
                organizations: annotate(self.entities.organizations),
                roles: annotate(self.entities.roles),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arclens_core::EntityType;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn candidate_json(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
    }

    #[tokio::test]
    async fn test_generate_extracts_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}:generateContent", FLASH_MODEL)))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_json("hello")))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "test-key");
        let text = backend
            .generate(FLASH_MODEL, vec![Part::text("hi")])
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_generate_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "test-key");
        let err = backend
            .generate(FLASH_MODEL, vec![Part::text("hi")])
            .await
            .unwrap_err();
        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_generate_maps_resource_exhausted_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#),
            )
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "test-key");
        let err = backend
            .generate(FLASH_MODEL, vec![Part::text("hi")])
            .await
            .unwrap_err();
        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_generate_maps_server_error_to_inference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "test-key");
        let err = backend
            .generate(FLASH_MODEL, vec![Part::text("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert!(!err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_analyze_page_parses_fenced_response() {
        let server = MockServer::start().await;
        let body = "```json\n{\"language\": \"Hebrew\", \"productionMode\": \"handwriting\", \"hasHebrewHandwriting\": true}\n```";
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_json(body)))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "test-key");
        let analysis = backend.analyze_page(b"imagebytes", "image/jpeg").await.unwrap();
        assert_eq!(analysis.language, "Hebrew");
        assert!(analysis.has_hebrew_handwriting);
    }

    #[tokio::test]
    async fn test_cluster_pages_annotates_known_entities() {
        let server = MockServer::start().await;
        let body = r#"[{
            "id": 1,
            "title": "Letter from Acre",
            "pageIds": [],
            "senders": [{"name": "Golda Meir", "role": "Secretary"}],
            "entities": {"people": ["Golda Meir", "Unknown Clerk"], "organizations": [], "roles": []}
        }]"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_json(body)))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "test-key");
        let vocab = vec![AuthorityRecord::new(2, "Golda Meir", EntityType::Person)];
        let clusters = backend
            .cluster_pages(&[], &vocab, Tier::Free)
            .await
            .unwrap();

        assert_eq!(clusters.len(), 1);
        let entities = clusters[0].entities.as_ref().unwrap();
        assert_eq!(entities.people[0].id, Some(2));
        assert_eq!(entities.people[1].id, None);
        assert_eq!(clusters[0].senders[0].id, Some(2));
        assert_eq!(clusters[0].senders[0].role.as_deref(), Some("Secretary"));
    }

    #[tokio::test]
    async fn test_paid_clustering_falls_back_to_flash() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}:generateContent", PRO_MODEL)))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}:generateContent", FLASH_MODEL)))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_json("[]")))
            .mount(&server)
            .await;

        let backend = GeminiBackend::new(server.uri(), "test-key");
        let clusters = backend.cluster_pages(&[], &[], Tier::Paid).await.unwrap();
        assert!(clusters.is_empty());
    }
}
