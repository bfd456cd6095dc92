//! Excel import/export for inventory snapshots
//!
//! - Export: areas of one building/date → .xlsx, one sheet per area
//! - Import: .xlsx/.xls bytes → areas + reconciled master catalog

pub mod cells;
mod exporter;
mod importer;

pub use exporter::{
    export_filename, sheet_name, ExportOptions, ExportedWorkbook, InventoryExporter,
    CURRENCY_FORMAT, HEADER, MAX_SHEET_NAME_CHARS,
};
pub use importer::{ImportOutcome, ImportWarning, InventoryImporter};
