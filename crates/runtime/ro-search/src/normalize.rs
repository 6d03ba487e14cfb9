//! Stored record to client record transformation.

use std::sync::Arc;

use ro_core::{
    normalize_doi, strip_profile_annotation, Creator, NormalizedRecord, StatusEntry, StoredRecord,
    NOT_FOUND,
};
use ro_people::PersonNameResolver;
use serde_json::Map;
use tracing::{debug, warn};

/// Reshapes stored records for clients, resolving creator names on the way.
pub struct RecordNormalizer {
    resolver: Arc<dyn PersonNameResolver>,
    success_stage: String,
}

impl RecordNormalizer {
    pub fn new(resolver: Arc<dyn PersonNameResolver>, success_stage: impl Into<String>) -> Self {
        Self {
            resolver,
            success_stage: success_stage.into(),
        }
    }

    /// Normalize one record.
    ///
    /// 1. Aggregation keys move to the top level, overwriting clashes.
    /// 2. The success status supplies the DOI and publication date, or
    ///    `"Not Found"` for each when absent.
    /// 3. The DOI becomes a resolver URL.
    /// 4. Creator ids are resolved to names, same cardinality.
    /// 5. Status is dropped.
    ///
    /// Directory failures only degrade names, so this never fails.
    pub async fn normalize(&self, raw: StoredRecord) -> NormalizedRecord {
        let (doi_source, publication_date) = publication_info(raw.status_for(&self.success_stage));
        let StoredRecord {
            aggregation,
            mut fields,
            ..
        } = raw;

        for (key, value) in aggregation {
            fields.insert(key, value);
        }

        let doi = normalize_doi(&doi_source);

        let creator_name = match fields.get("Creator").and_then(Creator::from_value) {
            Some(creator) => Some(self.resolve_creator(&creator).await),
            None => None,
        };

        strip_derived_keys(&mut fields);

        NormalizedRecord {
            fields,
            doi,
            publication_date,
            creator_name,
        }
    }

    /// Display names for every identifier, one directory call each.
    pub async fn resolve_creator(&self, creator: &Creator) -> Creator {
        let mut names = Vec::with_capacity(creator.len());
        for id in creator.identifiers() {
            names.push(self.display_name(id).await);
        }
        creator.with_values(names)
    }

    pub async fn display_name(&self, identifier: &str) -> String {
        match self.resolver.resolve(identifier).await {
            Ok(Some(profile)) => profile.display_name(identifier),
            Ok(None) => {
                debug!(identifier, "creator not in directory");
                strip_profile_annotation(identifier)
            }
            Err(e) => {
                warn!(identifier, error = %e, "creator lookup failed");
                strip_profile_annotation(identifier)
            }
        }
    }
}

/// DOI source and publication date from the success status, if any.
fn publication_info(success: Option<&StatusEntry>) -> (String, String) {
    match success {
        Some(entry) => (
            entry.message.clone().unwrap_or_else(|| NOT_FOUND.to_string()),
            entry.date.clone().unwrap_or_else(|| NOT_FOUND.to_string()),
        ),
        None => (NOT_FOUND.to_string(), NOT_FOUND.to_string()),
    }
}

/// Keys the normalizer writes itself must not appear twice.
fn strip_derived_keys(fields: &mut Map<String, serde_json::Value>) {
    for key in ["DOI", "Publication Date", "CreatorName"] {
        fields.shift_remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ro_people::{NullResolver, PeopleError, PersonProfile};
    use serde_json::json;

    struct Directory;

    #[async_trait]
    impl PersonNameResolver for Directory {
        async fn resolve(&self, identifier: &str) -> ro_people::Result<Option<PersonProfile>> {
            match identifier {
                "jsmith" => Ok(Some(PersonProfile::new(Some("Jane"), Some("Smith")))),
                "anon" => Ok(Some(PersonProfile::default())),
                "broken : http://vivo.example/broken" => Err(PeopleError::UnexpectedStatus {
                    identifier: identifier.to_string(),
                    status: 500,
                }),
                _ => Ok(None),
            }
        }
    }

    fn normalizer() -> RecordNormalizer {
        RecordNormalizer::new(Arc::new(Directory), "Success")
    }

    fn record(value: serde_json::Value) -> StoredRecord {
        StoredRecord::from_json(value).unwrap()
    }

    #[tokio::test]
    async fn test_flattens_and_extracts_publication() {
        let out = normalizer()
            .normalize(record(json!({
                "Status": [
                    {"stage": "Pending", "message": "queued", "date": "01/01/2020"},
                    {"stage": "Success", "message": "doi:10.5072/ABC", "date": "01/15/2020"}
                ],
                "Repository": "ideals",
                "Aggregation": {"Title": "Soil", "Identifier": "urn:1"}
            })))
            .await;

        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(
            value,
            json!({
                "Repository": "ideals",
                "Title": "Soil",
                "Identifier": "urn:1",
                "DOI": "http://dx.doi.org/10.5072/ABC",
                "Publication Date": "01/15/2020"
            })
        );
        assert!(value.get("Status").is_none());
        assert!(value.get("Aggregation").is_none());
    }

    #[tokio::test]
    async fn test_hoisted_keys_overwrite_in_place() {
        let out = normalizer()
            .normalize(record(json!({
                "Repository": "outer",
                "Other": 1,
                "Aggregation": {"Repository": "inner"}
            })))
            .await;

        let keys: Vec<&str> = out.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Repository", "Other"]);
        assert_eq!(out.fields["Repository"], json!("inner"));
    }

    #[tokio::test]
    async fn test_missing_success_status_defaults() {
        let out = normalizer()
            .normalize(record(json!({
                "Status": [{"stage": "Pending", "message": "doi:10.1/x", "date": "d"}],
                "Aggregation": {}
            })))
            .await;
        assert_eq!(out.publication_date, NOT_FOUND);
        assert_eq!(out.doi, "http://dx.doi.org/Not Found");
    }

    #[tokio::test]
    async fn test_last_success_status_wins() {
        let out = normalizer()
            .normalize(record(json!({
                "Status": [
                    {"stage": "Success", "message": "doi:10.1/old", "date": "01/01/2019"},
                    {"stage": "Success", "message": "doi:10.1/new", "date": "02/02/2020"}
                ]
            })))
            .await;
        assert_eq!(out.doi, "http://dx.doi.org/10.1/new");
        assert_eq!(out.publication_date, "02/02/2020");
    }

    #[tokio::test]
    async fn test_http_doi_kept() {
        let out = normalizer()
            .normalize(record(json!({
                "Status": [{"stage": "Success", "message": "https://doi.org/10.1/x", "date": "d"}]
            })))
            .await;
        assert_eq!(out.doi, "https://doi.org/10.1/x");
    }

    #[tokio::test]
    async fn test_single_creator_resolved() {
        let out = normalizer()
            .normalize(record(json!({"Aggregation": {"Creator": "jsmith"}})))
            .await;
        assert_eq!(out.creator_name, Some(Creator::Single("Jane Smith".into())));
        assert_eq!(out.creator(), Some(Creator::Single("jsmith".into())));
    }

    #[tokio::test]
    async fn test_multiple_creators_keep_order_and_length() {
        let out = normalizer()
            .normalize(record(json!({"Aggregation": {"Creator": [
                "xyz123 : http://vivo.example/xyz123",
                "jsmith",
                "anon",
                "broken : http://vivo.example/broken"
            ]}})))
            .await;
        assert_eq!(
            out.creator_name,
            Some(Creator::Multiple(vec![
                "xyz123".into(),
                "Jane Smith".into(),
                "anon".into(),
                "broken".into(),
            ]))
        );
    }

    #[tokio::test]
    async fn test_no_creator_no_creator_name() {
        let out = RecordNormalizer::new(Arc::new(NullResolver), "Success")
            .normalize(record(json!({"Aggregation": {"Title": "t"}})))
            .await;
        assert_eq!(out.creator_name, None);
    }

    #[tokio::test]
    async fn test_derived_keys_not_duplicated() {
        let out = normalizer()
            .normalize(record(json!({"Aggregation": {"DOI": "stale", "Creator": "jsmith"}})))
            .await;
        assert!(!out.fields.contains_key("DOI"));
        let text = serde_json::to_string(&out).unwrap();
        assert_eq!(text.matches("\"DOI\"").count(), 1);
    }
}
