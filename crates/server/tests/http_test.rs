#![cfg(feature = "http")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use futures::FutureExt;
use futures::future::BoxFuture;
use geocluster::compute::{FieldMap, RawRecord};
use geocluster::{
    ClusterError, ClusterResponse, EngineBuilder, FilterSet, ListingSource, MemorySource,
};
use geocluster_server::transport::http::router;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn listings(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "listingKey": format!("{}{}", prefix, i),
                "latitude": 34.0 + (i / 10) as f64 * 0.05,
                "longitude": -118.0 - (i % 10) as f64 * 0.05,
                "listPrice": 400_000 + i * 10_000,
                "propertyType": "A",
                "city": "Los Angeles"
            })
        })
        .collect()
}

struct Unreachable {
    fields: FieldMap,
}

impl ListingSource for Unreachable {
    fn tag(&self) -> &str {
        "crmls"
    }

    fn field_map(&self) -> &FieldMap {
        &self.fields
    }

    fn fetch<'a>(
        &'a self,
        _filter: &'a FilterSet,
        _limit: usize,
    ) -> BoxFuture<'a, geocluster::Result<Vec<RawRecord>>> {
        futures::future::ready(Err(ClusterError::source_failure("crmls", "unreachable"))).boxed()
    }

    fn count<'a>(&'a self, _filter: &'a FilterSet) -> BoxFuture<'a, geocluster::Result<u64>> {
        futures::future::ready(Err(ClusterError::source_failure("crmls", "unreachable"))).boxed()
    }
}

fn unreachable() -> Arc<dyn ListingSource> {
    Arc::new(Unreachable {
        fields: FieldMap::default(),
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let cache = response
        .headers()
        .get(header::CACHE_CONTROL)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, cache, body.to_vec())
}

#[tokio::test]
async fn test_clustered_endpoint() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let engine = EngineBuilder::new()
        .source(Arc::new(MemorySource::with_records("gps", listings("g", 40))))
        .build()?;

    let (status, cache, body) = get(
        router(Arc::new(engine)),
        "/api/listings/clustered?north=35&south=33&east=-117&west=-119&zoom=6",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        cache.as_deref(),
        Some("public, s-maxage=30, stale-while-revalidate=60")
    );

    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["clustered"], true);
    assert_eq!(json["zoom"], 6.0);
    assert_eq!(json["totalCount"]["gps"], 40);
    assert_eq!(json["totalCount"]["total"], 40);
    assert!(json["clusters"][0]["expansionZoom"].as_u64().unwrap() >= 6);

    let response: ClusterResponse = serde_json::from_slice(&body)?;
    assert_eq!(response.represented_points(), 40);
    Ok(())
}

#[tokio::test]
async fn test_street_level_returns_listings() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let engine = EngineBuilder::new()
        .source(Arc::new(MemorySource::with_records("gps", listings("g", 5))))
        .build()?;

    let (status, _, body) = get(
        router(Arc::new(engine)),
        "/api/listings/clustered?zoom=15&minPrice=410000&city=angeles",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["clustered"], false);
    assert_eq!(json["clusters"].as_array().unwrap().len(), 0);
    let listings = json["listings"].as_array().unwrap();
    assert_eq!(listings.len(), 4);
    assert_eq!(listings[0]["mlsSource"], "gps");
    assert_eq!(listings[0]["id"], "gps:g1");
    assert_eq!(listings[0]["latitude"], 34.0);
    Ok(())
}

#[tokio::test]
async fn test_malformed_parameters_still_succeed() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let engine = EngineBuilder::new()
        .source(Arc::new(MemorySource::with_records("gps", listings("g", 3))))
        .build()?;

    let (status, _, body) = get(
        router(Arc::new(engine)),
        "/api/listings/clustered?north=abc&zoom=NaN&beds=many&listingType=castle",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["zoom"], 10.0);
    assert_eq!(json["totalCount"]["total"], 3);
    Ok(())
}

#[tokio::test]
async fn test_repeated_parameters_keep_last_value() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let engine = EngineBuilder::new()
        .source(Arc::new(MemorySource::with_records("gps", listings("g", 3))))
        .build()?;

    let (status, _, body) = get(
        router(Arc::new(engine)),
        "/api/listings/clustered?zoom=5&zoom=6&north=35&north=36&ref=share&ref=map",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["zoom"], 6.0);
    assert_eq!(json["totalCount"]["total"], 3);
    Ok(())
}

#[tokio::test]
async fn test_closed_listings_excluded() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let records = vec![
        json!({ "listingKey": "a", "latitude": 34.0, "longitude": -118.0,
                "propertyType": "A", "standardStatus": "Active" }),
        json!({ "listingKey": "b", "latitude": 34.001, "longitude": -118.001,
                "propertyType": "A", "standardStatus": "Closed" }),
    ];
    let engine = Arc::new(
        EngineBuilder::new()
            .source(Arc::new(MemorySource::with_records("gps", records)))
            .build()?,
    );

    let (status, _, body) = get(router(engine.clone()), "/api/listings/clustered?zoom=15").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["totalCount"]["total"], 1);
    assert_eq!(json["listings"].as_array().unwrap().len(), 1);
    assert_eq!(json["listings"][0]["id"], "gps:a");

    let (_, _, body) = get(router(engine), "/api/listings/clustered?zoom=15&status=all").await;
    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["totalCount"]["total"], 2);
    Ok(())
}

#[tokio::test]
async fn test_partial_failure_is_success() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let engine = EngineBuilder::new()
        .source(Arc::new(MemorySource::with_records("gps", listings("g", 40))))
        .source(unreachable())
        .build()?;

    let (status, _, body) = get(router(Arc::new(engine)), "/api/listings/clustered?zoom=9").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json["totalCount"]["total"], 40);
    assert!(json["totalCount"].get("crmls").is_none());
    Ok(())
}

#[tokio::test]
async fn test_total_failure_is_500() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let engine = EngineBuilder::new().source(unreachable()).build()?;

    let (status, cache, body) = get(router(Arc::new(engine)), "/api/listings/clustered").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(cache.is_none());

    let json: Value = serde_json::from_slice(&body)?;
    assert_eq!(json, json!({ "error": "Clustering failed" }));
    Ok(())
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let engine = EngineBuilder::new().build()?;
    let (status, _, body) = get(router(Arc::new(engine)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
    Ok(())
}
