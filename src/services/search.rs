// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::search::{
    FacetBucket, FacetBuckets, IndexedDocument, SearchOptions, SearchRequest, SearchResponse,
    SearchResult,
};
use crate::services::logging::truncate_for_log;
use crate::services::query::{QueryBuilder, SearchBody, Suggestion};
use crate::services::schema::Facet;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures talking to the search engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Search engine transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search engine rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed search engine response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Invalid search engine URL '{0}'")]
    InvalidUrl(String),
}

/// Where the engine lives and which environment's index to use
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub url: Url,
    pub environment: String,
    pub request_timeout: Duration,
}

impl EngineConfig {
    pub fn new(host: &str, environment: impl Into<String>) -> Result<Self, EngineError> {
        // Construct the full URL if only host:port is provided
        let raw = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        let mut url = Url::parse(&raw).map_err(|_| EngineError::InvalidUrl(host.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(EngineError::InvalidUrl(host.to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            url,
            environment: environment.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Per-environment index, e.g. `projects-production`
    pub fn index_name(&self) -> String {
        format!("projects-{}", self.environment)
    }

    fn endpoint(&self, path: &str) -> Result<Url, EngineError> {
        self.url
            .join(path)
            .map_err(|_| EngineError::InvalidUrl(format!("{}{}", self.url, path)))
    }
}

/// Result of removing a document from the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The document was not in the index; callers treat this as success
    NotFound,
}

/// Search engine client for indexing and searching catalog projects
pub struct SearchClient {
    http: reqwest::Client,
    config: EngineConfig,
    builder: QueryBuilder,
    index_name: String,
}

impl SearchClient {
    pub fn new(config: EngineConfig, builder: QueryBuilder) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let index_name = config.index_name();

        tracing::info!(url = %config.url, index = %index_name, "Configured search engine client");

        Ok(Self {
            http,
            config,
            builder,
            index_name,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Check that the engine answers at all
    pub async fn health(&self) -> Result<(), EngineError> {
        let response = self.http.get(self.config.url.clone()).send().await?;
        ensure_success(response).await.map(|_| ())
    }

    /// Search projects
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, EngineError> {
        let (query_text, options) = request.to_parts();
        let body = self.builder.build(&query_text, &options);

        tracing::debug!(
            query = %truncate_for_log(&query_text),
            filters = options.filters.len(),
            prefix = options.prefix,
            api = options.api,
            page = options.page,
            "Searching projects"
        );

        let raw = self.execute(&body).await?;
        let response = parse_search_response(raw, &query_text, !options.api)?;

        tracing::debug!(
            total = response.total,
            returned = response.results.len(),
            took_ms = response.processing_ms,
            "Search completed"
        );

        Ok(response)
    }

    /// Facet counts for `options` without a result list
    pub async fn facets(&self, options: &SearchOptions) -> Result<FacetBuckets, EngineError> {
        let body = self.builder.facets(options);
        let raw = self.execute(&body).await?;
        Ok(parse_aggregations(raw.aggregations.as_ref())?)
    }

    /// Index a single document, replacing any previous version
    pub async fn index_document(&self, doc: &IndexedDocument) -> Result<(), EngineError> {
        let url = self.document_url(doc.id)?;
        let response = self.http.request(Method::PUT, url).json(doc).send().await?;
        ensure_success(response).await?;

        tracing::debug!(id = doc.id, index = %self.index_name, "Indexed project");
        Ok(())
    }

    /// Delete a document from the index
    pub async fn delete_document(&self, id: i64) -> Result<DeleteOutcome, EngineError> {
        let url = self.document_url(id)?;
        let response = self.http.delete(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(id, index = %self.index_name, "Project was not indexed");
            return Ok(DeleteOutcome::NotFound);
        }

        ensure_success(response).await?;
        tracing::debug!(id, index = %self.index_name, "Removed project from index");
        Ok(DeleteOutcome::Deleted)
    }

    async fn execute(&self, body: &SearchBody) -> Result<EngineSearchResponse, EngineError> {
        let url = self
            .config
            .endpoint(&format!("{}/_search", self.index_name))?;

        let response = self.http.post(url).json(body).send().await?;
        let bytes = ensure_success(response).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn document_url(&self, id: i64) -> Result<Url, EngineError> {
        self.config
            .endpoint(&format!("{}/_doc/{}", self.index_name, id))
    }
}

/// Pass successful bodies through; turn any other status into `Rejected`
async fn ensure_success(response: reqwest::Response) -> Result<Vec<u8>, EngineError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes).into_owned();
        tracing::warn!(status = status.as_u16(), "Search engine rejected request");
        return Err(EngineError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    Ok(bytes.to_vec())
}

#[derive(Debug, Deserialize)]
struct EngineSearchResponse {
    #[serde(default)]
    took: u64,
    hits: EngineHits,
    #[serde(default)]
    aggregations: Option<Map<String, Value>>,
    #[serde(default)]
    suggest: Option<BTreeMap<String, Vec<SuggestEntry>>>,
}

#[derive(Debug, Deserialize)]
struct EngineHits {
    #[serde(default)]
    total: Option<EngineTotal>,
    #[serde(default)]
    hits: Vec<EngineHit>,
}

/// Older engines report a bare count, newer ones an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EngineTotal {
    Count(u64),
    Object { value: u64 },
}

#[derive(Debug, Deserialize)]
struct EngineHit {
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: IndexedDocument,
}

#[derive(Debug, Deserialize)]
struct SuggestEntry {
    text: String,
    #[serde(default)]
    options: Vec<SuggestOption>,
}

#[derive(Debug, Deserialize)]
struct SuggestOption {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TermsBuckets {
    #[serde(default)]
    buckets: Vec<FacetBucket>,
}

fn parse_search_response(
    raw: EngineSearchResponse,
    query_text: &str,
    with_facets: bool,
) -> Result<SearchResponse, serde_json::Error> {
    let total = match raw.hits.total {
        Some(EngineTotal::Count(count)) | Some(EngineTotal::Object { value: count }) => count,
        None => raw.hits.hits.len() as u64,
    };

    let facets = if with_facets {
        Some(parse_aggregations(raw.aggregations.as_ref())?)
    } else {
        None
    };

    let suggestion = raw
        .suggest
        .as_ref()
        .and_then(|suggest| suggest.get(Suggestion::NAME))
        .and_then(|entries| suggested_text(entries, query_text));

    let results = raw
        .hits
        .hits
        .into_iter()
        .map(|hit| SearchResult {
            document: hit.source,
            score: hit.score,
        })
        .collect();

    Ok(SearchResponse {
        results,
        total,
        facets,
        suggestion,
        processing_ms: raw.took,
    })
}

/// Buckets per facet field from the filter-wrapped terms aggregations
fn parse_aggregations(
    aggregations: Option<&Map<String, Value>>,
) -> Result<FacetBuckets, serde_json::Error> {
    let mut facets = FacetBuckets::new();
    let Some(aggregations) = aggregations else {
        return Ok(facets);
    };

    for (name, wrapper) in aggregations {
        let Some(facet) = Facet::from_agg_name(name) else {
            continue;
        };
        let Some(terms) = wrapper.get(name) else {
            continue;
        };
        let terms: TermsBuckets = serde_json::from_value(terms.clone())?;
        facets.insert(facet.field().to_string(), terms.buckets);
    }

    Ok(facets)
}

/// Rebuild the query with each term replaced by its best alternative.
/// Returns `None` when nothing would change.
fn suggested_text(entries: &[SuggestEntry], query_text: &str) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let suggested = entries
        .iter()
        .map(|entry| {
            entry
                .options
                .first()
                .map(|option| option.text.as_str())
                .unwrap_or(entry.text.as_str())
        })
        .collect::<Vec<_>>()
        .join(" ");

    if suggested.eq_ignore_ascii_case(query_text.trim()) {
        None
    } else {
        Some(suggested)
    }
}
