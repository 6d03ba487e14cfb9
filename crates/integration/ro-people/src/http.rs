//! HTTP person directory client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::{PeopleError, PersonNameResolver, PersonProfile, Result};

/// Resolves identifiers with `GET {base_url}/people/{identifier}`.
///
/// The identifier is sent as one percent-encoded path segment, so ids that
/// are themselves URLs survive intact. `200` carries a profile, `404` means
/// unknown; anything else is an error.
#[derive(Debug, Clone)]
pub struct HttpPeopleResolver {
    client: Client,
    base_url: Url,
}

impl HttpPeopleResolver {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let invalid = |reason: &str| PeopleError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL"));
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn profile_url(&self, identifier: &str) -> Url {
        let mut url = self.base_url.clone();
        // checked in with_client
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("people").push(identifier);
        }
        url
    }
}

#[async_trait]
impl PersonNameResolver for HttpPeopleResolver {
    async fn resolve(&self, identifier: &str) -> Result<Option<PersonProfile>> {
        let url = self.profile_url(identifier);
        let response = self.client.get(url.clone()).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                let profile = serde_json::from_str(&body).map_err(|source| {
                    PeopleError::MalformedProfile {
                        identifier: identifier.to_string(),
                        source,
                    }
                })?;
                Ok(Some(profile))
            }
            StatusCode::NOT_FOUND => {
                debug!(%url, "no directory profile");
                Ok(None)
            }
            status => Err(PeopleError::UnexpectedStatus {
                identifier: identifier.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}
