//! Resilience Flux - Recovery resilience scoring for journal records
//!
//! Flux turns a list of journal entries into a 0-100 resilience score through
//! a deterministic pipeline: record adaptation → entry classification →
//! challenge/recovery pairing → weighted scoring → report encoding.
//!
//! ## Modules
//!
//! - **Schema**: Parse `journal.record.v1` input (JSON array or NDJSON)
//! - **Classifier / Pairing / Scorer**: The scoring core, pure and total
//! - **Encoder**: Wrap results into a versioned report with quality flags

pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod lexicon;
pub mod pairing;
pub mod pipeline;
pub mod schema;
pub mod scorer;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::EntryClassifier;
pub use config::{ConfidenceScale, ScoringConfig};
pub use error::ResilienceError;
pub use pairing::PairingEngine;
pub use pipeline::{classify_records, compute_resilience, records_to_resilience, ResilienceProcessor};
pub use scorer::ResilienceScorer;

// Schema exports
pub use schema::{RawRecord, RecordAdapter, SCHEMA_VERSION};

pub use types::{
    ChallengeSeverity, ClassifiedRecord, Record, RecoveryPeriod, RecoveryStrength,
    ResilienceLevel, ResilienceReport, ResilienceResult, Trend,
};

/// Library version embedded in all reports
pub const RESILIENCE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "resilience-flux";
