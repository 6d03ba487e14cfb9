//! # ro-web
//!
//! JSON-over-HTTP surface for the search pipeline.
//!
//! | Method | Path           | Body            | Result                          |
//! |--------|----------------|-----------------|---------------------------------|
//! | GET    | `/search`      | none            | every published record          |
//! | POST   | `/search`      | `SearchRequest` | records passing the filters     |
//! | GET    | `/api/health`  | none            | liveness                        |
//!
//! Both search routes take an optional `?repo=<name>` and answer with a JSON
//! array and `Cache-Control: no-cache`.

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::Router;
use ro_search::SearchPipeline;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared across all requests for the life of the process.
pub struct AppState {
    pub pipeline: SearchPipeline,
}

impl AppState {
    pub fn new(pipeline: SearchPipeline) -> Self {
        Self { pipeline }
    }
}

/// Build the router. Requests running longer than `request_timeout` are
/// abandoned with `408`, which drops the in-flight store cursor.
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .merge(routes::search::router())
        .merge(routes::health::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(cors),
        )
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(
    state: Arc<AppState>,
    addr: &str,
    request_timeout: Duration,
) -> std::io::Result<()> {
    let app = create_router(state, request_timeout);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("research object search listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
