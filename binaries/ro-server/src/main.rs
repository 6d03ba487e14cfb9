//! ro-server - search service for published research objects
//!
//! ## Usage
//!
//! ```bash
//! ro-server                              # defaults, or ~/.config/ro-search/config.yaml
//! ro-server --config ./ro-search.yaml    # explicit config file
//! ro-server --bind 127.0.0.1:9000        # override the listen address
//! ro-server --ensure-text-index          # create the text index first
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ro_config::Config;
use ro_mongodb::MongoStore;
use ro_people::{HttpPeopleResolver, NullResolver, PersonNameResolver};
use ro_search::SearchPipeline;
use ro_web::{serve, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ro-server", version, about = "Search published research objects")]
struct Args {
    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(long)]
    bind: Option<String>,

    /// Create the wildcard text index before serving
    #[arg(long)]
    ensure_text_index: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ro_server=info,ro_web=info,ro_search=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let store = MongoStore::connect(
        &config.mongodb.uri,
        &config.mongodb.database,
        &config.mongodb.collection,
    )
    .await
    .context("connecting to MongoDB")?;

    if args.ensure_text_index || config.mongodb.ensure_text_index {
        store
            .ensure_text_index()
            .await
            .context("creating text index")?;
    }

    let resolver: Arc<dyn PersonNameResolver> = match &config.people.base_url {
        Some(url) => Arc::new(
            HttpPeopleResolver::new(url, config.people.timeout(), &config.people.user_agent)
                .context("configuring person directory")?,
        ),
        None => {
            tracing::warn!("no person directory configured, creator names are not resolved");
            Arc::new(NullResolver)
        }
    };

    tracing::info!(
        database = %config.mongodb.database,
        collection = %config.mongodb.collection,
        success_stage = %config.search.success_stage,
        "search pipeline ready"
    );

    let pipeline = SearchPipeline::new(
        Arc::new(store),
        resolver,
        config.search.success_stage.clone(),
    );
    let state = Arc::new(AppState::new(pipeline));

    serve(state, &config.server.bind, config.server.request_timeout())
        .await
        .context("serving HTTP")?;

    Ok(())
}
