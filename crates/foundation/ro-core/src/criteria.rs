//! Search filter criteria and the request body they are parsed from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dates::parse_request_date;

/// Body of a filtered search request.
///
/// Every key must be present; an empty string means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "Creator")]
    pub creator: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "Search String")]
    pub search_string: String,
    #[serde(rename = "Title")]
    pub title: String,
}

/// Validated search constraints. `None` leaves a dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub repository: Option<String>,
    /// Regex source. `(.*)<pattern>(.*)` must match a whole creator id,
    /// case-insensitively.
    pub creator_pattern: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search_text: Option<String>,
    /// Regex source, matched case-insensitively against the title.
    pub title_pattern: Option<String>,
}

impl FilterCriteria {
    /// No constraints beyond "published".
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_repository(repository: Option<String>) -> Self {
        Self {
            repository: non_empty(repository),
            ..Self::default()
        }
    }

    /// Build criteria from a request body and the optional `repo` parameter.
    ///
    /// Dates that do not parse as `MM/DD/YYYY` are dropped with a warning;
    /// each bound is handled on its own.
    pub fn from_request(request: &SearchRequest, repository: Option<String>) -> Self {
        Self {
            repository: non_empty(repository),
            creator_pattern: non_empty(Some(request.creator.clone())),
            start_date: request_date("Start Date", &request.start_date),
            end_date: request_date("End Date", &request.end_date),
            search_text: non_empty(Some(request.search_string.clone())),
            title_pattern: non_empty(Some(request.title.clone())),
        }
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = non_empty(Some(repository.into()));
        self
    }

    pub fn with_creator_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.creator_pattern = non_empty(Some(pattern.into()));
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = non_empty(Some(text.into()));
        self
    }

    pub fn with_title_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.title_pattern = non_empty(Some(pattern.into()));
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// True when dates or the creator pattern need checking after retrieval.
    pub fn has_post_filters(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some() || self.creator_pattern.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn request_date(field: &str, input: &str) -> Option<NaiveDate> {
    if input.trim().is_empty() {
        return None;
    }
    match parse_request_date(input) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(field, error = %e, "ignoring unparsable request date");
            None
        }
    }
}
