//! API request handlers
//!
//! JSON endpoints answer with the [`ApiResponse`] envelope; the export
//! endpoint answers with the workbook itself.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{StockError, StockResult};
use crate::excel::{ExportOptions, ImportWarning, InventoryExporter, InventoryImporter};
use crate::types::{snapshot_total, Area, Building, Product};

use super::server::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// HTTP status for a failed operation
fn status_for(error: &StockError) -> StatusCode {
    match error {
        StockError::NotFound(_) | StockError::EmptyExportTarget { .. } => StatusCode::NOT_FOUND,
        StockError::Validation(_) => StatusCode::BAD_REQUEST,
        e if e.is_workbook_content() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error envelope with a status matching the error kind
fn error_response(error: StockError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        warn!("request failed: {}", error);
    }
    (status, Json(ApiResponse::<()>::err(error.to_string()))).into_response()
}

fn json_result<T: Serialize>(result: StockResult<T>) -> Response {
    match result {
        Ok(data) => Json(ApiResponse::ok(data)).into_response(),
        Err(e) => error_response(e),
    }
}

fn parse_date(raw: &str) -> StockResult<NaiveDate> {
    raw.parse::<NaiveDate>().map_err(|_| {
        StockError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", raw))
    })
}

fn resolve(state: &AppState, building: &str, date: &str) -> StockResult<(Building, NaiveDate)> {
    let building = state.config.building(building)?.clone();
    Ok((building, parse_date(date)?))
}

//==============================================================================
// Info endpoints
//==============================================================================

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(method: &str, path: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Stockbook API Server".to_string(),
        version: state.version.clone(),
        description: "Inventory counts with Excel import and export".to_string(),
        endpoints: vec![
            endpoint("GET", "/health", "Health check endpoint"),
            endpoint("GET", "/version", "Get server version"),
            endpoint("GET", "/api/v1/buildings", "List configured buildings"),
            endpoint(
                "GET",
                "/api/v1/snapshot/:building/:date",
                "Areas and counts for a building on a date",
            ),
            endpoint(
                "POST",
                "/api/v1/import/:building/:date",
                "Import a workbook (raw body) for a building on a date",
            ),
            endpoint(
                "GET",
                "/api/v1/export/:building/:date",
                "Download the snapshot as .xlsx (?with_totals=true for a re-importable layout)",
            ),
            endpoint("GET", "/api/v1/products", "Search the master catalog (?q=)"),
            endpoint(
                "DELETE",
                "/api/v1/products/:id",
                "Delete a product everywhere",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: ["snapshot", "import", "export", "products"]
            .iter()
            .map(|f| f.to_string())
            .collect(),
    }))
}

/// GET /api/v1/buildings
pub async fn buildings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.config.buildings.clone()))
}

//==============================================================================
// Snapshots
//==============================================================================

#[derive(Serialize, Default)]
pub struct SnapshotResponse {
    pub building: String,
    pub date: String,
    pub areas: Vec<Area>,
    pub total_value: f64,
}

/// GET /api/v1/snapshot/:building/:date - areas for a date, carried forward
/// from the latest earlier count when the date is new
pub async fn snapshot(
    State(state): State<Arc<AppState>>,
    Path((building, date)): Path<(String, String)>,
) -> Response {
    json_result(load_snapshot(&state, &building, &date))
}

fn load_snapshot(state: &AppState, building: &str, date: &str) -> StockResult<SnapshotResponse> {
    let (building, date) = resolve(state, building, date)?;
    let areas = state.update(|inventory| {
        inventory.ensure_snapshot(&building.id, date);
        Ok(inventory.snapshot(&building.id, date).to_vec())
    })?;
    Ok(SnapshotResponse {
        building: building.name,
        date: date.to_string(),
        total_value: snapshot_total(&areas),
        areas,
    })
}

//==============================================================================
// Import / Export
//==============================================================================

#[derive(Serialize, Default)]
pub struct ImportResponse {
    pub building: String,
    pub date: String,
    pub areas: usize,
    pub items: usize,
    pub new_products: usize,
    /// Id of the first imported area, shown first by clients
    pub active_area: Option<String>,
    pub warnings: Vec<ImportWarning>,
}

/// POST /api/v1/import/:building/:date - raw workbook bytes in the body
pub async fn import_workbook(
    State(state): State<Arc<AppState>>,
    Path((building, date)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    json_result(run_import(&state, &building, &date, &body))
}

fn run_import(
    state: &AppState,
    building: &str,
    date: &str,
    bytes: &[u8],
) -> StockResult<ImportResponse> {
    let (building, date) = resolve(state, building, date)?;
    let response = state.update(|inventory| {
        let outcome = InventoryImporter::new(&inventory.products).import(bytes)?;
        let response = ImportResponse {
            building: building.name.clone(),
            date: date.to_string(),
            areas: outcome.areas.len(),
            items: outcome.item_count(),
            new_products: outcome.new_products,
            active_area: None,
            warnings: outcome.warnings.clone(),
        };
        let active_area = inventory.apply_import(&building.id, date, outcome);
        Ok(ImportResponse {
            active_area,
            ..response
        })
    })?;
    info!(
        "imported {} areas for {} on {}",
        response.areas, building.name, date
    );
    Ok(response)
}

#[derive(Deserialize, Default)]
pub struct ExportQuery {
    #[serde(default)]
    pub with_totals: bool,
}

/// GET /api/v1/export/:building/:date - the snapshot as an .xlsx attachment,
/// carried forward first when the date is new
pub async fn export_workbook(
    State(state): State<Arc<AppState>>,
    Path((building, date)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let exporter = InventoryExporter::with_options(ExportOptions {
        with_totals: query.with_totals,
    });
    let result = resolve(&state, &building, &date).and_then(|(building, date)| {
        state.update(|inventory| {
            inventory.ensure_snapshot(&building.id, date);
            exporter.export(inventory.snapshot(&building.id, date), &building.name, date)
        })
    });

    match result {
        Ok(workbook) => (
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", workbook.filename),
                ),
            ],
            workbook.bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

//==============================================================================
// Catalog
//==============================================================================

#[derive(Deserialize, Default)]
pub struct ProductQuery {
    pub q: Option<String>,
}

/// GET /api/v1/products?q=
pub async fn products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> impl IntoResponse {
    let inventory = state.lock();
    let found: Vec<Product> = inventory
        .search_products(query.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(ApiResponse::ok(found))
}

/// DELETE /api/v1/products/:id - remove from the catalog and every snapshot
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    json_result(state.update(|inventory| inventory.delete_product(&id)))
}
