//! Centralized default constants for arclens.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

use crate::models::{AuthorityRecord, EntityType};

// =============================================================================
// INFERENCE MODELS
// =============================================================================

/// Fast multimodal model used for page analysis, transcription, and
/// free-tier clustering.
pub const FLASH_MODEL: &str = "gemini-3-flash-preview";

/// Higher-quality model used for paid-tier clustering.
pub const PRO_MODEL: &str = "gemini-3-pro-preview";

/// Default base URL for the generative API.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "ARCLENS_API_KEY";

/// Per-request timeout for inference calls, seconds.
pub const INFERENCE_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// BATCH CONCURRENCY
// =============================================================================

/// Concurrent page-analysis calls on the free tier.
pub const FREE_ANALYSIS_CONCURRENCY: usize = 2;

/// Concurrent transcription calls on the free tier. Transcription responses
/// are large, so the constrained tier runs strictly sequentially.
pub const FREE_TRANSCRIPTION_CONCURRENCY: usize = 1;

/// Concurrent calls of either kind on the paid tier.
pub const PAID_CONCURRENCY: usize = 5;

// =============================================================================
// RETRY / BACKOFF
// =============================================================================

/// Maximum retries for rate-limit-class failures. Other failures are never
/// retried.
pub const MAX_RETRIES: u32 = 3;

/// Base backoff delay in milliseconds; doubles per attempt.
pub const BACKOFF_BASE_MS: u64 = 4_000;

// =============================================================================
// CLUSTERING INPUT
// =============================================================================

/// Per-page transcription truncation for the clustering prompt, characters.
pub const CLUSTERING_TRANSCRIPTION_LIMIT: usize = 15_000;

// =============================================================================
// SEED VOCABULARY
// =============================================================================

/// The bundled authority seed list loaded into every new project's master
/// vocabulary. Ids below [`SEED_VOCABULARY_CEILING`] are reserved for it;
/// runtime additions start above the ceiling.
pub const SEED_VOCABULARY_CEILING: u32 = 1_000;

/// Build the bundled seed list of authority records.
pub fn seed_vocabulary() -> Vec<AuthorityRecord> {
    let person = EntityType::Person;
    let org = EntityType::Organization;
    let role = EntityType::Role;

    let mut seed = vec![
        AuthorityRecord::new(1, "David Ben-Gurion", person),
        AuthorityRecord::new(2, "Golda Meir", person),
        AuthorityRecord::new(3, "Chaim Weizmann", person),
        AuthorityRecord::new(4, "Moshe Sharett", person),
        AuthorityRecord::new(5, "Yitzhak Ben-Zvi", person),
        AuthorityRecord::new(6, "Henrietta Szold", person),
        AuthorityRecord::new(7, "Ze'ev Jabotinsky", person),
        AuthorityRecord::new(8, "Berl Katznelson", person),
        AuthorityRecord::new(101, "Jewish Agency for Palestine", org),
        AuthorityRecord::new(102, "Haganah", org),
        AuthorityRecord::new(103, "Va'ad Leumi", org),
        AuthorityRecord::new(104, "Histadrut", org),
        AuthorityRecord::new(105, "Magen David Adom", org),
        AuthorityRecord::new(106, "Keren Hayesod", org),
        AuthorityRecord::new(201, "High Commissioner", role),
        AuthorityRecord::new(202, "District Commissioner", role),
        AuthorityRecord::new(203, "Chief Secretary", role),
        AuthorityRecord::new(204, "Commandant", role),
        AuthorityRecord::new(205, "Chief Rabbi", role),
    ];

    seed[0].life_span = Some("1886-1973".to_string());
    seed[1].life_span = Some("1898-1978".to_string());
    seed[2].life_span = Some("1874-1952".to_string());
    seed
}
