//! MongoDB-backed record store.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::{StreamExt, TryStreamExt};
use mongodb::{Client, Collection, IndexModel};
use ro_core::StoredRecord;
use tracing::{debug, info};

use crate::{RecordQuery, RecordStore, RecordStream, Result, StoreError};

/// Read-only handle on the research object collection.
///
/// Cheap to clone; the driver pools connections internally, so one instance
/// is shared by every request for the life of the process.
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        info!(database, collection, "connected to MongoDB");
        Ok(Self::from_collection(
            client.database(database).collection(collection),
        ))
    }

    pub fn from_collection(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// Create a wildcard text index so `$text` queries can run.
    ///
    /// A no-op when an equivalent index already exists.
    pub async fn ensure_text_index(&self) -> Result<()> {
        let index = IndexModel::builder().keys(doc! { "$**": "text" }).build();
        let created = self.collection.create_index(index).await?;
        info!(index = %created.index_name, "text index ready");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn find(&self, query: &RecordQuery) -> Result<RecordStream> {
        let filter = query.filter();
        debug!(%filter, "querying research objects");

        let cursor = self
            .collection
            .find(filter)
            .projection(query.projection())
            .await
            .map_err(StoreError::from_mongo)?;

        Ok(cursor
            .map_err(StoreError::from_mongo)
            .and_then(|doc| async move { decode(doc) })
            .boxed())
    }
}

/// Convert a raw document through relaxed extended JSON.
pub(crate) fn decode(doc: Document) -> Result<StoredRecord> {
    let value = Bson::Document(doc).into_relaxed_extjson();
    Ok(StoredRecord::from_json(value)?)
}
