mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use tower::ServiceExt;

use etherfi_bids_exporter::handlers::metrics_endpoint;
use etherfi_bids_exporter::metrics::ExporterMetrics;
use etherfi_bids_exporter::AppState;

use crate::common::setup_test_db;

async fn build_test_router() -> (Router, ExporterMetrics) {
    let db = setup_test_db().await.expect("Failed to connect to test DB");
    let metrics = ExporterMetrics::new().unwrap();

    let router = Router::new()
        .route("/metrics", get(metrics_endpoint::get_metrics))
        .with_state(AppState {
            db,
            metrics: metrics.clone(),
        });

    (router, metrics)
}

#[tokio::test]
async fn test_metrics_endpoint_serves_exposition_text() {
    let (app, metrics) = build_test_router().await;

    metrics.api_health.set(1);
    metrics
        .active_bids
        .with_label_values(&["0xabc"])
        .set(4);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("etherfi_bids_api_health 1"));
    assert!(text.contains("etherfi_bids_active{bidder_address=\"0xabc\"} 4"));
}

#[tokio::test]
async fn test_metrics_endpoint_serves_empty_registry() {
    let (app, _metrics) = build_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Nothing has been set yet; the endpoint still answers 200 with the
    // registered-but-valueless families encoded away
    assert_eq!(response.status(), StatusCode::OK);
}
