//! Structured logging field name constants for arclens.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log tooling can query by standardized names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values |
//! | TRACE | Per-item iteration (per-mention, per-page) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "recon", "inference", "export"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "aggregator", "vocabulary", "gemini", "pipeline"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "aggregate", "resync", "cluster_pages", "analyze_page"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Page UUID being operated on.
pub const PAGE_ID: &str = "page_id";

/// Cluster numeric id being operated on.
pub const CLUSTER_ID: &str = "cluster_id";

/// Reconciliation record UUID.
pub const RECORD_ID: &str = "record_id";

/// Authority record id in the master vocabulary.
pub const AUTHORITY_ID: &str = "authority_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of raw mentions walked in an aggregation pass.
pub const MENTION_COUNT: &str = "mention_count";

/// Number of reconciliation records produced.
pub const RECORD_COUNT: &str = "record_count";

/// Number of pages in a batch.
pub const PAGE_COUNT: &str = "page_count";

/// Number of clusters produced or consumed.
pub const CLUSTER_COUNT: &str = "cluster_count";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Retry attempt number for a rate-limited call.
pub const ATTEMPT: &str = "attempt";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
