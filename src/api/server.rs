//! Stockbook API Server implementation
//!
//! HTTP API server using Axum for a browser front end. Serves snapshots,
//! workbook import/export and catalog search over one shared inventory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::core::Inventory;
use crate::error::StockResult;
use crate::store;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub config_path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub version: String,
    pub config: Config,
    inventory: Mutex<Inventory>,
}

impl AppState {
    pub fn new(config: Config, inventory: Inventory) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            inventory: Mutex::new(inventory),
        }
    }

    /// Load the store named by the config
    pub fn load(config: Config) -> StockResult<Self> {
        let inventory = store::load(&config.store_path)?;
        Ok(Self::new(config, inventory))
    }

    /// Lock the inventory. A panic in another handler does not leave the
    /// data half-written, so a poisoned lock is still usable.
    pub fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inventory
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `change` against a copy of the inventory. The copy is saved and
    /// swapped in only when it differs; on any error the shared inventory and
    /// the store file stay as they were.
    pub fn update<T>(
        &self,
        change: impl FnOnce(&mut Inventory) -> StockResult<T>,
    ) -> StockResult<T> {
        let mut inventory = self.lock();
        let mut next = inventory.clone();
        let value = change(&mut next)?;
        if next != *inventory {
            store::save(&self.config.store_path, &next)?;
            *inventory = next;
        }
        Ok(value)
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Inventory endpoints
        .route("/api/v1/buildings", get(handlers::buildings))
        .route("/api/v1/snapshot/:building/:date", get(handlers::snapshot))
        .route(
            "/api/v1/import/:building/:date",
            post(handlers::import_workbook),
        )
        .route(
            "/api/v1/export/:building/:date",
            get(handlers::export_workbook),
        )
        .route("/api/v1/products", get(handlers::products))
        .route("/api/v1/products/:id", delete(handlers::delete_product))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockbook=info,stockbook_server=info,tower_http=info".into()),
        )
        .init();

    let app_config = Config::load(&config.config_path)?;
    let state = Arc::new(AppState::load(app_config)?);
    info!(
        "   Store: {} ({} buildings configured)",
        state.config.store_path.display(),
        state.config.buildings.len()
    );

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("📦 Stockbook API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/buildings, /api/v1/snapshot, /api/v1/import, /api/v1/export, /api/v1/products");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stockbook API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
