// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use catalog_search::app::{create_router, AppState, VERSION};
use catalog_search::models::search::{FacetsResponse, SearchResponse};
use catalog_search::models::version::VersionResponse;
use catalog_search::services::query::QueryBuilder;
use catalog_search::services::search::{EngineConfig, SearchClient};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_without_engine() -> Router {
    create_router(AppState {
        search_client: None,
    })
}

fn app_with_engine(server: &MockServer) -> Router {
    let config = EngineConfig::new(&server.uri(), "test").unwrap();
    let client = SearchClient::new(config, QueryBuilder::default()).unwrap();
    create_router(AppState {
        search_client: Some(Arc::new(client)),
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_version_endpoint_response() {
    let response = app_without_engine()
        .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let version: VersionResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(version.service, "catalog-search");
    assert_eq!(version.version, VERSION);
    assert_eq!(version.index, "");
}

#[tokio::test]
async fn test_search_without_engine_is_unavailable() {
    let response = app_without_engine()
        .oneshot(post_json("/search", json!({ "q": "redux" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_search_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects-test/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] },
            "aggregations": {
                "platforms": { "doc_count": 0, "platforms": { "buckets": [] } }
            }
        })))
        .mount(&server)
        .await;

    let response = app_with_engine(&server)
        .oneshot(post_json(
            "/search",
            json!({ "q": "reac", "prefix": "true", "filters": { "platform": "NPM" } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let search: SearchResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(search.total, 0);
    assert!(search.facets.unwrap().contains_key("platform"));

    let requests = server.received_requests().await.unwrap();
    let sent: Value = requests[0].body_json().unwrap();
    assert_eq!(
        sent["query"]["function_score"]["query"]["bool"]["must"],
        json!({ "prefix": { "exact_name": "reac" } })
    );
    assert_eq!(
        sent["post_filter"],
        json!({ "bool": { "must": [ { "terms": { "platform": ["NPM"] } } ] } })
    );
}

#[tokio::test]
async fn test_engine_failure_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("shard failure"))
        .mount(&server)
        .await;

    let response = app_with_engine(&server)
        .oneshot(post_json("/search", json!({ "q": "redux" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let message = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(!message.contains("shard failure"));
    assert!(message.contains("search engine error"));
}

#[tokio::test]
async fn test_facets_endpoint_returns_cache_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects-test/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": { "total": 0, "hits": [] },
            "aggregations": {
                "languages": { "doc_count": 3, "languages": { "buckets": [ { "key": "Rust", "doc_count": 3 } ] } }
            }
        })))
        .mount(&server)
        .await;

    let app = app_with_engine(&server);
    let request_body = json!({ "filters": { "platform": "Cargo" } });

    let first = app
        .clone()
        .oneshot(post_json("/facets", request_body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first: FacetsResponse = serde_json::from_slice(&body_bytes(first).await).unwrap();
    assert_eq!(first.facets["language"][0].key, "Rust");

    let second = app
        .oneshot(post_json("/facets", request_body))
        .await
        .unwrap();
    let second: FacetsResponse = serde_json::from_slice(&body_bytes(second).await).unwrap();
    assert_eq!(first.cache_key, second.cache_key);
}

#[tokio::test]
async fn test_invalid_route_returns_404() {
    let response = app_without_engine()
        .oneshot(Request::builder().uri("/invalid").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_lists_search_routes() {
    let response = app_without_engine()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(doc["paths"].get("/search").is_some());
    assert!(doc["paths"].get("/facets").is_some());
}
