//! # arclens-inference
//!
//! External AI call layer: page analysis, transcription, and clustering
//! against the Gemini API, behind backend traits so the rest of the
//! system never touches HTTP.
//!
//! The surrounding engine treats every call here as fallible and
//! per-item isolated: one page failing analysis must never abort its
//! siblings, and a failed pass simply leaves the page carrying an error
//! status and no entity data.

pub mod gemini;
pub mod oracle;
pub mod pipeline;
pub mod repair;
pub mod retry;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use gemini::GeminiBackend;
pub use oracle::{
    ClusterOracle, PageAnalysis, PageAnalyzer, PageDigest, PageTranscriber, PageTranscription,
};
pub use pipeline::{
    analyze_pages, apply_analysis, apply_transcription, run_clustering, transcribe_pages,
    ImagePart, PageOutcome,
};
