// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::models::search::{
    FacetBucket, FacetsResponse, IndexedDocument, SearchRequest, SearchResponse, SearchResult,
};
use crate::models::version::VersionResponse;
use crate::services::search::{EngineError, SearchClient};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `CATALOG_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("CATALOG_SEARCH_VERSION");

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// `None` when the engine was unreachable at startup
    pub search_client: Option<Arc<SearchClient>>,
}

type ApiError = (StatusCode, String);

fn require_search(state: &AppState) -> Result<&SearchClient, ApiError> {
    state.search_client.as_deref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Search service is not available".to_string(),
        )
    })
}

fn engine_error(context: &str, error: EngineError) -> ApiError {
    tracing::error!(error = %error, "{} failed", context);
    (
        StatusCode::BAD_GATEWAY,
        format!("{context} failed: search engine error"),
    )
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/version",
    responses((status = 200, description = "Service version", body = VersionResponse))
)]
pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "catalog-search".to_string(),
        version: VERSION.to_string(),
        index: state
            .search_client
            .as_ref()
            .map(|client| client.index_name().to_string())
            .unwrap_or_default(),
    })
}

#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Ranked projects with facets", body = SearchResponse),
        (status = 502, description = "Search engine failed"),
        (status = 503, description = "Search engine not configured")
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let search_client = require_search(&state)?;

    search_client
        .search(&payload)
        .await
        .map(Json)
        .map_err(|e| engine_error("Search", e))
}

#[utoipa::path(
    post,
    path = "/facets",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Facet counts only", body = FacetsResponse),
        (status = 502, description = "Search engine failed"),
        (status = 503, description = "Search engine not configured")
    )
)]
pub async fn facets_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<FacetsResponse>, ApiError> {
    let search_client = require_search(&state)?;
    let (_, options) = payload.to_parts();

    let facets = search_client
        .facets(&options)
        .await
        .map_err(|e| engine_error("Facets", e))?;

    Ok(Json(FacetsResponse {
        facets,
        cache_key: options.cache_key(),
    }))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(version_handler, search_handler, facets_handler),
    components(schemas(
        VersionResponse,
        SearchRequest,
        SearchResponse,
        SearchResult,
        IndexedDocument,
        FacetBucket,
        FacetsResponse
    ))
)]
pub struct ApiDoc;

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/search", post(search_handler))
        .route("/facets", post(facets_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
