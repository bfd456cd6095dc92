//! Stockbook API Server module
//!
//! Provides the HTTP API used by the browser front end.
//! Run with `stockbook-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server, ApiConfig, AppState};
