//! # ro-core
//!
//! Data model for the research object search service.
//!
//! ```text
//!  StoredRecord ──normalize──▶ NormalizedRecord ──serialize──▶ JSON array
//!   ├─ Status[]                  ├─ <Aggregation keys hoisted>
//!   ├─ Repository                ├─ DOI
//!   └─ Aggregation{..}           ├─ Publication Date
//!                                └─ CreatorName
//! ```
//!
//! Nothing in here talks to the database or the network. The store lives in
//! `ro-mongodb`, the person directory in `ro-people`, and the pipeline that
//! ties them together in `ro-search`.

pub mod creator;
pub mod criteria;
pub mod dates;
pub mod doi;
pub mod record;

pub use creator::{strip_profile_annotation, Creator};
pub use criteria::{FilterCriteria, SearchRequest};
pub use dates::{parse_publication_date, parse_request_date};
pub use doi::{normalize_doi, DOI_RESOLVER_BASE};
pub use record::{NormalizedRecord, StatusEntry, StoredRecord, NOT_FOUND};

/// Status stage that marks a research object as published.
pub const DEFAULT_SUCCESS_STAGE: &str = "Success";

/// Result type for ro-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ro-core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid date '{input}': expected {expected}")]
    InvalidDate { input: String, expected: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
