//! # ro-search
//!
//! The search pipeline over published research objects.
//!
//! ```text
//! FilterCriteria
//!   │  QueryBuilder            (ro-mongodb)
//!   ▼
//! RecordStore::find ──▶ StoredRecord stream
//!   │  RecordNormalizer        hoist Aggregation, DOI, date, creator names
//!   ▼
//! NormalizedRecord
//!   │  PostQueryFilter         date range AND creator pattern
//!   ▼
//! response array, in cursor order
//! ```

pub mod filter;
pub mod normalize;
pub mod pipeline;

pub use filter::PostQueryFilter;
pub use normalize::RecordNormalizer;
pub use pipeline::SearchPipeline;

use ro_mongodb::StoreError;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid creator pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SearchError {
    /// True when the request itself was bad (malformed regex).
    pub fn is_client_error(&self) -> bool {
        match self {
            SearchError::InvalidPattern { .. } => true,
            SearchError::Store(e) => e.is_client_error(),
        }
    }
}
