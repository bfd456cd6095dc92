//! Stockbook - storage-area inventory counts for food-service buildings
//!
//! Tracks what is on the shelves of every storage area, per building and per
//! count date, against one master product catalog.
//!
//! # Features
//!
//! - Workbook import with SKU reconciliation against the master catalog
//! - One-sheet-per-area `.xlsx` export, optionally re-importable
//! - Carry-forward of the previous count's layout to a new date
//! - Catalog edits and deletions cascade into every recorded count
//! - JSON store, YAML config, CLI and HTTP API front ends
//!
//! # Example
//!
//! ```no_run
//! use stockbook::excel::{InventoryExporter, InventoryImporter};
//! use stockbook::store;
//! use chrono::NaiveDate;
//! use std::path::Path;
//!
//! let mut inventory = store::load(Path::new("stockbook.json"))?;
//! let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
//!
//! let outcome = InventoryImporter::new(&inventory.products).import_file("counts.xlsx")?;
//! inventory.apply_import("bldg-1", date, outcome);
//!
//! let workbook = InventoryExporter::new().export(
//!     inventory.snapshot("bldg-1", date),
//!     "Yablokoff-Wallace Dining Center",
//!     date,
//! )?;
//! workbook.save_to(Path::new("."))?;
//! store::save(Path::new("stockbook.json"), &inventory)?;
//! # Ok::<(), stockbook::error::StockError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod mail;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use crate::core::Inventory;
pub use error::{StockError, StockResult};
pub use types::{Area, Building, CountUnit, LineItem, NewProduct, Product};
