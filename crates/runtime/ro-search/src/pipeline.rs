//! Search orchestration: query, normalize, post-filter.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use ro_core::{FilterCriteria, NormalizedRecord};
use ro_mongodb::{QueryBuilder, RecordStore};
use ro_people::PersonNameResolver;
use tracing::debug;

use crate::{PostQueryFilter, RecordNormalizer, Result, SearchError};

/// Runs searches against an injected store and person directory.
///
/// Holds no per-request state; one instance serves every request.
pub struct SearchPipeline {
    store: Arc<dyn RecordStore>,
    queries: QueryBuilder,
    normalizer: RecordNormalizer,
}

impl SearchPipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        resolver: Arc<dyn PersonNameResolver>,
        success_stage: impl Into<String>,
    ) -> Self {
        let success_stage = success_stage.into();
        Self {
            store,
            queries: QueryBuilder::new(success_stage.clone()),
            normalizer: RecordNormalizer::new(resolver, success_stage),
        }
    }

    /// Matching records, produced lazily from a single pass over the store
    /// cursor, in cursor order.
    ///
    /// Dropping the stream early releases the cursor.
    pub async fn stream(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<BoxStream<'_, Result<NormalizedRecord>>> {
        let filter = PostQueryFilter::new(criteria)?;
        let query = self.queries.build(criteria);
        debug!(?query, post_filters = criteria.has_post_filters(), "running search");

        let records = self.store.find(&query).await?;
        let normalizer = &self.normalizer;

        Ok(records
            .map_err(SearchError::from)
            .try_filter_map(move |raw| {
                let filter = filter.clone();
                async move {
                    let record = normalizer.normalize(raw).await;
                    Ok::<_, SearchError>(filter.admits(&record).then_some(record))
                }
            })
            .boxed())
    }

    /// Collect every matching record. An empty result is not an error.
    pub async fn search(&self, criteria: &FilterCriteria) -> Result<Vec<NormalizedRecord>> {
        let records: Vec<NormalizedRecord> = self.stream(criteria).await?.try_collect().await?;
        debug!(count = records.len(), "search complete");
        Ok(records)
    }
}
