//! Filter criteria to MongoDB query translation.
//!
//! Only constraints the server can evaluate reliably are pushed down:
//! published status, repository, full-text search and title regex. Date
//! bounds and the creator pattern are checked after retrieval.

use bson::{doc, Document};
use ro_core::FilterCriteria;

/// Aggregation sub-fields returned to clients.
pub const PROJECTED_AGGREGATION_FIELDS: &[&str] = &[
    "Identifier",
    "Creator",
    "Title",
    "Contact",
    "Abstract",
    "Publishing Project Name",
    "Publishing Project",
];

/// A store query for published research objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub success_stage: String,
    pub repository: Option<String>,
    pub search_text: Option<String>,
    pub title_pattern: Option<String>,
}

impl RecordQuery {
    /// The MongoDB filter document.
    ///
    /// ```text
    /// { Status: { $elemMatch: { stage: <success> } },
    ///   Repository: <repo>,
    ///   $text: { $search: "\"<text>\"" },
    ///   Aggregation.Title: { $regex: <title>, $options: "i" } }
    /// ```
    pub fn filter(&self) -> Document {
        let mut filter = doc! {
            "Status": { "$elemMatch": { "stage": self.success_stage.as_str() } },
        };
        if let Some(repo) = &self.repository {
            filter.insert("Repository", repo.as_str());
        }
        if let Some(text) = &self.search_text {
            // quoted: phrase search
            filter.insert("$text", doc! { "$search": format!("\"{text}\"") });
        }
        if let Some(title) = &self.title_pattern {
            filter.insert(
                "Aggregation.Title",
                doc! { "$regex": title.as_str(), "$options": "i" },
            );
        }
        filter
    }

    /// The projection document: status, repository and the listed
    /// aggregation fields, without `_id`.
    pub fn projection(&self) -> Document {
        let mut projection = doc! { "Status": 1, "Repository": 1 };
        for field in PROJECTED_AGGREGATION_FIELDS {
            projection.insert(format!("Aggregation.{field}"), 1);
        }
        projection.insert("_id", 0);
        projection
    }
}

/// Builds [`RecordQuery`]s for a fixed success stage.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    success_stage: String,
}

impl QueryBuilder {
    pub fn new(success_stage: impl Into<String>) -> Self {
        Self {
            success_stage: success_stage.into(),
        }
    }

    pub fn build(&self, criteria: &FilterCriteria) -> RecordQuery {
        RecordQuery {
            success_stage: self.success_stage.clone(),
            repository: criteria.repository.clone(),
            search_text: criteria.search_text.clone().filter(|s| !s.is_empty()),
            title_pattern: criteria.title_pattern.clone().filter(|s| !s.is_empty()),
        }
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(ro_core::DEFAULT_SUCCESS_STAGE)
    }
}
