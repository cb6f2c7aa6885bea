// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use catalog_search::app::{create_router, AppState, VERSION};
use catalog_search::services::logging;
use catalog_search::services::query::{QueryBuilder, RetiredPlatforms};
use catalog_search::services::search::{EngineConfig, SearchClient};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Catalog project search service
#[derive(Debug, Parser)]
#[command(name = "catalog-search", version = VERSION)]
struct Cli {
    /// Search engine base URL (host:port is accepted)
    #[arg(long, env = "ELASTICSEARCH_URL", default_value = "http://127.0.0.1:9200")]
    engine_url: String,

    /// Environment name; selects the `projects-<environment>` index
    #[arg(long, env = "CATALOG_ENV", default_value = "development")]
    environment: String,

    /// Address the HTTP API listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Comma-separated platforms excluded from every search
    #[arg(long, env = "RETIRED_PLATFORMS")]
    retired_platforms: Option<String>,

    /// Per-request timeout for engine calls, in seconds
    #[arg(long, env = "ENGINE_TIMEOUT_SECS", default_value_t = 10)]
    engine_timeout_secs: u64,
}

impl Cli {
    fn retired_platforms(&self) -> RetiredPlatforms {
        match &self.retired_platforms {
            Some(raw) => RetiredPlatforms::parse(raw),
            None => RetiredPlatforms::default(),
        }
    }
}

/// Connect to the engine; the API still starts (answering 503) when it is down
async fn connect_search(cli: &Cli) -> Result<Option<Arc<SearchClient>>> {
    let config = EngineConfig::new(&cli.engine_url, cli.environment.clone())
        .context("Invalid search engine URL")?
        .with_request_timeout(Duration::from_secs(cli.engine_timeout_secs));

    let builder = QueryBuilder::new(cli.retired_platforms());
    let client = SearchClient::new(config, builder).context("Failed to build HTTP client")?;

    match client.health().await {
        Ok(()) => {
            tracing::info!(index = client.index_name(), "Connected to search engine");
            Ok(Some(Arc::new(client)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reach search engine");
            tracing::warn!("Continuing without search functionality");
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("catalog_search=info");

    let cli = Cli::parse();
    let search_client = connect_search(&cli).await?;

    let app = create_router(AppState { search_client });

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;

    tracing::info!(addr = %cli.bind, version = VERSION, "catalog-search listening");

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
