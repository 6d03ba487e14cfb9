//! `/search`: list and filter published research objects.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use ro_core::{FilterCriteria, NormalizedRecord, SearchRequest};
use serde::Deserialize;

use crate::{ApiError, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(list_published).post(filter_published))
        .route("/search/", get(list_published).post(filter_published))
}

/// `?repo=<name>`. An empty value (`?repo=`) is the same as leaving it out.
#[derive(Debug, Default, Deserialize)]
pub struct RepoQuery {
    pub repo: Option<String>,
}

/// Every published record, optionally restricted to one repository.
/// `?repo=` with no value lists every repository.
async fn list_published(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RepoQuery>,
) -> Result<Response, ApiError> {
    let criteria = FilterCriteria::for_repository(q.repo);
    let records = state.pipeline.search(&criteria).await?;
    Ok(no_cache(records))
}

/// Published records matching the filters in the body.
async fn filter_published(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RepoQuery>,
    Json(body): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let criteria = FilterCriteria::from_request(&body, q.repo);
    let records = state.pipeline.search(&criteria).await?;
    Ok(no_cache(records))
}

fn no_cache(records: Vec<NormalizedRecord>) -> Response {
    ([(header::CACHE_CONTROL, "no-cache")], Json(records)).into_response()
}
