//! Predicates applied after retrieval.
//!
//! Stored publication dates are free-form strings and creators may be a
//! string or a list, so neither the date range nor the creator pattern is
//! sent to the store.

use chrono::NaiveDateTime;
use regex::Regex;
use ro_core::{parse_publication_date, Creator, FilterCriteria, NormalizedRecord};

use crate::{Result, SearchError};

#[derive(Debug, Clone, Default)]
pub struct PostQueryFilter {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    creator: Option<Regex>,
}

impl PostQueryFilter {
    /// Compile the date bounds and creator pattern from `criteria`.
    ///
    /// The creator pattern is wrapped in `.*` on both sides and the result
    /// must match a whole identifier, case-insensitively. `.` stops at line
    /// breaks, and a top-level `a|b` in the pattern binds to the wrapping.
    /// A pattern that does not compile is a client error.
    pub fn new(criteria: &FilterCriteria) -> Result<Self> {
        let creator = match criteria.creator_pattern.as_deref() {
            Some(pattern) => Some(Regex::new(&format!("^(?:(?i)(.*){pattern}(.*))$")).map_err(
                |source| SearchError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                },
            )?),
            None => None,
        };

        Ok(Self {
            start: criteria.start_date.and_then(|d| d.and_hms_opt(0, 0, 0)),
            end: criteria.end_date.and_then(|d| d.and_hms_opt(0, 0, 0)),
            creator,
        })
    }

    /// Both predicates must pass.
    pub fn admits(&self, record: &NormalizedRecord) -> bool {
        self.within_date_range(&record.publication_date)
            && self.creator_matches(record.creator().as_ref())
    }

    /// Bounds are midnight of the requested day. Dates that cannot be
    /// parsed always pass.
    pub fn within_date_range(&self, publication_date: &str) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(published) = parse_publication_date(publication_date) else {
            return true;
        };
        let after_start = self.start.map_or(true, |start| start <= published);
        let before_end = self.end.map_or(true, |end| end >= published);
        after_start && before_end
    }

    /// Matches stored identifiers, not resolved names. Any element of a
    /// list may match.
    pub fn creator_matches(&self, creator: Option<&Creator>) -> bool {
        match (&self.creator, creator) {
            (Some(re), Some(creator)) => creator.any(|id| re.is_match(id)),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Map};

    fn date(m: u32, d: u32, y: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn record(publication_date: &str, creator: serde_json::Value) -> NormalizedRecord {
        let mut fields = Map::new();
        fields.insert("Creator".into(), creator);
        NormalizedRecord {
            fields,
            doi: "http://dx.doi.org/10.1/x".into(),
            publication_date: publication_date.into(),
            creator_name: None,
        }
    }

    #[test]
    fn test_start_after_publication_excludes() {
        let criteria = FilterCriteria::all().with_date_range(date(2, 1, 2020), None);
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(!filter.admits(&record("01/15/2020", json!(null))));

        let open = PostQueryFilter::new(&FilterCriteria::all()).unwrap();
        assert!(open.admits(&record("01/15/2020", json!(null))));
    }

    #[test]
    fn test_end_bound_is_midnight() {
        let criteria = FilterCriteria::all().with_date_range(None, date(1, 15, 2020));
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(filter.within_date_range("01/15/2020"));
        assert!(!filter.within_date_range("Jan 15, 2020 10:30:00 AM"));
        assert!(filter.within_date_range("Jan 14, 2020 11:59:59 PM"));
    }

    #[test]
    fn test_inside_range() {
        let criteria = FilterCriteria::all().with_date_range(date(1, 1, 2020), date(12, 31, 2020));
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(filter.within_date_range("2020-06-01T12:00:00Z"));
        assert!(!filter.within_date_range("2021-01-02"));
    }

    #[test]
    fn test_unparsable_date_passes() {
        let criteria = FilterCriteria::all().with_date_range(date(2, 1, 2020), date(3, 1, 2020));
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(filter.within_date_range("Not Found"));
        assert!(filter.within_date_range("sometime in spring"));
    }

    #[test]
    fn test_creator_any_element_case_insensitive() {
        let criteria = FilterCriteria::all().with_creator_pattern("smith");
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(filter.admits(&record("", json!(["Jane Smith", "Bob Lee"]))));
        assert!(!filter.admits(&record("", json!(["Bob Lee"]))));
        assert!(filter.admits(&record("", json!("SMITHSONIAN"))));
        assert!(!filter.admits(&record("", json!("Lee"))));
    }

    #[test]
    fn test_creator_pattern_is_regex() {
        let criteria = FilterCriteria::all().with_creator_pattern("j.*n smi");
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(filter.admits(&record("", json!("Jane Smith"))));

        let criteria = FilterCriteria::all().with_creator_pattern("orcid:0000-000[0-9]");
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(filter.admits(&record("", json!("orcid:0000-0003-1234"))));
    }

    #[test]
    fn test_creator_pattern_matches_whole_identifier() {
        // (.*)smith|lee(.*) needs "...smith" or "lee..." in full
        let criteria = FilterCriteria::all().with_creator_pattern("smith|lee");
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(!filter.admits(&record("", json!("Bob Lee"))));
        assert!(filter.admits(&record("", json!("Jane Smith"))));
        assert!(filter.admits(&record("", json!("Lee Bob"))));

        let criteria = FilterCriteria::all().with_creator_pattern("smith");
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(!filter.admits(&record("", json!("Jane\nSmith"))));
    }

    #[test]
    fn test_creator_absent_or_unshaped_passes() {
        let criteria = FilterCriteria::all().with_creator_pattern("smith");
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(filter.admits(&record("", json!(null))));
        assert!(filter.admits(&record("", json!({"name": "Bob"}))));
    }

    #[test]
    fn test_invalid_creator_pattern() {
        let criteria = FilterCriteria::all().with_creator_pattern("(unclosed");
        let err = PostQueryFilter::new(&criteria).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_both_predicates_required() {
        let criteria = FilterCriteria::all()
            .with_creator_pattern("smith")
            .with_date_range(date(1, 1, 2021), None);
        let filter = PostQueryFilter::new(&criteria).unwrap();
        assert!(!filter.admits(&record("06/01/2020", json!("Jane Smith"))));
        assert!(filter.admits(&record("06/01/2021", json!("Jane Smith"))));
    }
}
