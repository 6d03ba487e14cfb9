//! # ro-people
//!
//! Creator identifiers on research objects point into a person directory.
//! This crate defines the lookup seam, [`PersonNameResolver`], and two
//! implementations:
//!
//! - [`HttpPeopleResolver`]: `GET {base}/people/{id}` against the directory
//! - [`NullResolver`]: knows nobody; every lookup is a miss
//!
//! Lookups are never cached. Falling back to a readable label on a miss is
//! the caller's job.

pub mod http;

pub use http::HttpPeopleResolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, PeopleError>;

#[derive(Debug, thiserror::Error)]
pub enum PeopleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid directory URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Directory returned status {status} for '{identifier}'")]
    UnexpectedStatus { identifier: String, status: u16 },

    #[error("Malformed profile for '{identifier}': {source}")]
    MalformedProfile {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A directory profile. Only the name parts are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonProfile {
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

impl PersonProfile {
    pub fn new(given_name: Option<&str>, family_name: Option<&str>) -> Self {
        Self {
            given_name: given_name.map(str::to_string),
            family_name: family_name.map(str::to_string),
        }
    }

    /// `"<given> <family>"` trimmed; the identifier itself when the profile
    /// has neither part.
    pub fn display_name(&self, identifier: &str) -> String {
        if self.given_name.is_none() && self.family_name.is_none() {
            return identifier.to_string();
        }
        format!(
            "{} {}",
            self.given_name.as_deref().unwrap_or_default(),
            self.family_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// Looks up creator identifiers in a person directory.
#[async_trait]
pub trait PersonNameResolver: Send + Sync {
    /// `Ok(None)` when the directory has no profile for `identifier`.
    async fn resolve(&self, identifier: &str) -> Result<Option<PersonProfile>>;
}

/// A resolver with an empty directory.
///
/// Used when no directory is configured, so every creator falls back to its
/// stripped identifier.
pub struct NullResolver;

#[async_trait]
impl PersonNameResolver for NullResolver {
    async fn resolve(&self, _identifier: &str) -> Result<Option<PersonProfile>> {
        Ok(None)
    }
}
