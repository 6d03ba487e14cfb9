//! # ro-mongodb
//!
//! Read access to the research object collection.
//!
//! [`QueryBuilder`] turns filter criteria into a [`RecordQuery`], which
//! renders to the MongoDB filter and projection documents. A [`RecordStore`]
//! executes it and streams back [`StoredRecord`]s.
//!
//! Two stores ship here: [`MongoStore`] over a real collection, and
//! [`MemoryStore`], which evaluates the same query against documents held in
//! memory.

pub mod memory;
pub mod mongo;
pub mod query;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use query::{QueryBuilder, RecordQuery, PROJECTED_AGGREGATION_FIELDS};

use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::error::ErrorKind;
use ro_core::StoredRecord;

/// Server error codes for a malformed `$regex` or `$options`.
const BAD_VALUE: i32 = 2;
const INVALID_REGEX: i32 = 51091;
const INVALID_REGEX_OPTIONS: i32 = 51108;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Records as the store yields them. Dropping the stream releases the
/// underlying cursor.
pub type RecordStream = BoxStream<'static, Result<StoredRecord>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Malformed record: {0}")]
    Decode(#[from] ro_core::Error),
}

impl StoreError {
    /// Classify a driver error. Regex failures come from client input.
    pub fn from_mongo(err: mongodb::error::Error) -> Self {
        let code = match *err.kind {
            ErrorKind::Command(ref command) => Some(command.code),
            _ => None,
        };
        match code {
            Some(BAD_VALUE | INVALID_REGEX | INVALID_REGEX_OPTIONS) => {
                StoreError::InvalidQuery(err.to_string())
            }
            _ => StoreError::Mongo(err),
        }
    }

    /// True when the failure was caused by the request rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::InvalidQuery(_))
    }
}

/// Source of published research object records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run `query` and stream matching records in store order.
    async fn find(&self, query: &RecordQuery) -> Result<RecordStream>;
}
