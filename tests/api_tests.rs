//! API integration tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

mod common;

use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use stockbook::api::{router, AppState};
use stockbook::config::Config;
use stockbook::{store, Inventory};
use tempfile::TempDir;
use tower::ServiceExt;

fn app(dir: &Path) -> Router {
    let config = Config {
        store_path: dir.join("store.json"),
        ..Default::default()
    };
    router(Arc::new(AppState::load(config).unwrap()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn import(app: &Router, uri: &str, bytes: Vec<u8>) -> (StatusCode, Value) {
    let request = Request::post(uri).body(Body::from(bytes)).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health_and_version() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "healthy");
    assert!(json["request_id"].as_str().is_some());

    let (_, json) = get_json(&app, "/version").await;
    assert_eq!(json["data"]["version"], env!("CARGO_PKG_VERSION"));

    let (_, json) = get_json(&app, "/").await;
    assert_eq!(json["data"]["name"], "Stockbook API Server");
}

#[tokio::test]
async fn test_buildings() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get_json(&app(dir.path()), "/api/v1/buildings").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"][1]["name"], "Pavilion");
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT / SNAPSHOT / EXPORT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_import_snapshot_and_export() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    let (status, json) = import(
        &app,
        "/api/v1/import/bldg-1/2025-03-01",
        common::sample_counts(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["areas"], 2);
    assert_eq!(json["data"]["items"], 2);
    assert_eq!(json["data"]["new_products"], 2);
    assert!(json["data"]["active_area"].as_str().is_some());

    // Saved immediately
    let stored = store::load(&dir.path().join("store.json")).unwrap();
    assert_eq!(stored.products.len(), 2);

    let (status, json) = get_json(&app, "/api/v1/snapshot/bldg-1/2025-03-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["areas"][0]["name"], "Walk-In Cooler");
    assert_eq!(json["data"]["areas"][1]["name"], "Main Freezer");
    // 5 each x $8 + 2 cases x $180
    assert_eq!(json["data"]["total_value"], 400.0);

    let request = Request::get("/api/v1/export/bldg-1/2025-03-01?with_totals=true")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        "attachment; filename=\"Yablokoff-Wallace Dining Center Inventory - 2025-03-01.xlsx\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    // The with-totals export imports straight back
    let (status, json) = import(&app, "/api/v1/import/bldg-1/2025-03-02", bytes.to_vec()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["new_products"], 0);
}

#[tokio::test]
async fn test_snapshot_carries_forward() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());
    import(
        &app,
        "/api/v1/import/Pavilion/2025-03-01",
        common::sample_counts(),
    )
    .await;

    let (status, json) = get_json(&app, "/api/v1/snapshot/Pavilion/2025-03-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["areas"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["areas"][0]["items"][0]["count"], 0.0);
    assert_eq!(json["data"]["total_value"], 0.0);
}

#[tokio::test]
async fn test_export_new_date_carries_forward() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());
    import(
        &app,
        "/api/v1/import/bldg-1/2025-03-01",
        common::sample_counts(),
    )
    .await;

    // 2025-03-20 was never viewed
    let request = Request::get("/api/v1/export/bldg-1/2025-03-20")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!bytes.is_empty());

    let stored = store::load(&dir.path().join("store.json")).unwrap();
    let carried = stored.snapshot("bldg-1", "2025-03-20".parse().unwrap());
    assert_eq!(carried.len(), 2);
    assert!(carried
        .iter()
        .flat_map(|area| &area.items)
        .all(|item| item.count == 0.0));
}

#[tokio::test]
async fn test_import_that_cannot_be_saved_keeps_state() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());
    // A directory in place of the store file makes every save fail
    std::fs::create_dir(dir.path().join("store.json")).unwrap();

    let (status, json) = import(
        &app,
        "/api/v1/import/bldg-1/2025-03-01",
        common::sample_counts(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);

    let (status, json) = get_json(&app, "/api/v1/snapshot/bldg-1/2025-03-01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["areas"].as_array().unwrap().is_empty());

    let (_, json) = get_json(&app, "/api/v1/products").await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_import_keeps_state() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    let empty = common::workbook(&[
        ("Totals", common::totals_sheet(&["Walk-In Cooler"])),
        (
            "Cooler",
            vec![vec![common::T("Walk-In Cooler")], common::item_header()],
        ),
    ]);
    let (status, json) = import(&app, "/api/v1/import/bldg-1/2025-03-01", empty).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("No valid inventory items"));

    assert!(!dir.path().join("store.json").exists());
    let (_, json) = get_json(&app, "/api/v1/snapshot/bldg-1/2025-03-01").await;
    assert!(json["data"]["areas"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_empty_snapshot_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (status, json) = get_json(&app(dir.path()), "/api/v1/export/bldg-2/2025-03-01").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("No data to export"));
}

#[tokio::test]
async fn test_bad_building_and_date() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());

    let (status, _) = get_json(&app, "/api/v1/snapshot/Library/2025-03-01").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get_json(&app, "/api/v1/snapshot/bldg-1/March-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("YYYY-MM-DD"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CATALOG TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_products_search_and_delete() {
    let dir = TempDir::new().unwrap();
    let app = app(dir.path());
    import(
        &app,
        "/api/v1/import/bldg-1/2025-03-01",
        common::sample_counts(),
    )
    .await;

    let (_, json) = get_json(&app, "/api/v1/products").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (_, json) = get_json(&app, "/api/v1/products?q=salmon").await;
    let found = json["data"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["sku"], "SKU-8899");
    let id = found[0]["id"].as_str().unwrap().to_string();

    let request = Request::delete(format!("/api/v1/products/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["productName"], "Salmon Fillet");

    let stored: Inventory = store::load(&dir.path().join("store.json")).unwrap();
    assert_eq!(stored.products.len(), 1);
    assert!(stored.line_items().all(|i| i.product.sku != "SKU-8899"));

    let request = Request::delete(format!("/api/v1/products/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
