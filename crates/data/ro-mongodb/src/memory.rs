//! In-memory record store.
//!
//! Evaluates [`RecordQuery`] the way the server does, closely enough for
//! tests and local demos:
//!
//! * published: some `Status` element has the success stage
//! * repository: exact match on `Repository`
//! * title: case-insensitive regex on `Aggregation.Title`
//! * text: case-insensitive phrase containment in any string value
//!
//! and applies the same inclusion projection.

use async_trait::async_trait;
use bson::{Bson, Document};
use futures::StreamExt;
use regex::RegexBuilder;

use crate::mongo::decode;
use crate::query::PROJECTED_AGGREGATION_FIELDS;
use crate::{RecordQuery, RecordStore, RecordStream, Result, StoreError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Build from JSON documents, as they would be exported from the
    /// collection.
    pub fn from_json(values: Vec<serde_json::Value>) -> Result<Self> {
        let documents = values
            .into_iter()
            .map(|value| match Bson::try_from(value) {
                Ok(Bson::Document(doc)) => Ok(doc),
                Ok(other) => Err(StoreError::Decode(ro_core::Error::InvalidRecord(
                    format!("expected a document, got {other}"),
                ))),
                Err(e) => Err(StoreError::Decode(ro_core::Error::InvalidRecord(
                    e.to_string(),
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn matches(&self, doc: &Document, query: &RecordQuery, title: Option<&regex::Regex>) -> bool {
        is_published(doc, &query.success_stage)
            && query
                .repository
                .as_deref()
                .map_or(true, |repo| doc.get_str("Repository").ok() == Some(repo))
            && title.map_or(true, |re| {
                doc.get_document("Aggregation")
                    .and_then(|agg| agg.get_str("Title"))
                    .map_or(false, |t| re.is_match(t))
            })
            && query
                .search_text
                .as_deref()
                .map_or(true, |text| contains_text(&Bson::Document(doc.clone()), &text.to_lowercase()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, query: &RecordQuery) -> Result<RecordStream> {
        let title = match &query.title_pattern {
            Some(pattern) => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| StoreError::InvalidQuery(e.to_string()))?,
            ),
            None => None,
        };

        let records: Vec<Result<_>> = self
            .documents
            .iter()
            .filter(|doc| self.matches(doc, query, title.as_ref()))
            .map(|doc| decode(project(doc)))
            .collect();

        Ok(futures::stream::iter(records).boxed())
    }
}

fn is_published(doc: &Document, stage: &str) -> bool {
    match doc.get_array("Status") {
        Ok(entries) => entries.iter().any(|entry| {
            entry
                .as_document()
                .and_then(|e| e.get_str("stage").ok())
                == Some(stage)
        }),
        Err(_) => false,
    }
}

fn contains_text(value: &Bson, needle: &str) -> bool {
    match value {
        Bson::String(s) => s.to_lowercase().contains(needle),
        Bson::Document(doc) => doc.values().any(|v| contains_text(v, needle)),
        Bson::Array(items) => items.iter().any(|v| contains_text(v, needle)),
        _ => false,
    }
}

/// Keep `Status`, `Repository` and the projected aggregation fields, in
/// stored order.
fn project(doc: &Document) -> Document {
    let mut out = Document::new();
    for (key, value) in doc {
        match key.as_str() {
            "Status" | "Repository" => {
                out.insert(key.clone(), value.clone());
            }
            "Aggregation" => {
                if let Bson::Document(agg) = value {
                    let kept: Document = agg
                        .iter()
                        .filter(|(k, _)| PROJECTED_AGGREGATION_FIELDS.contains(&k.as_str()))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    out.insert(key.clone(), kept);
                }
            }
            _ => {}
        }
    }
    out
}
