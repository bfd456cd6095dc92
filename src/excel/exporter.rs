//! Excel exporter implementation - inventory snapshot → .xlsx

use crate::error::{StockError, StockResult};
use crate::types::{snapshot_total, Area, LineItem};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Longest sheet name Excel accepts
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Number format of the Case Price, Ea. Price and Total Cost cells
pub const CURRENCY_FORMAT: &str = "$#,##0.00";

pub const HEADER: [&str; 11] = [
    "Company",
    "Brand",
    "Description",
    "Item #",
    "Case Qty",
    "Package",
    "Case Price",
    "Ea. Price",
    "Count",
    "Total Cost",
    "Count as",
];

const COLUMN_WIDTHS: [f64; 11] = [20.0, 20.0, 40.0, 15.0, 10.0, 15.0, 12.0, 12.0, 10.0, 12.0, 10.0];

const TOTALS_SHEET: &str = "Totals";
const TOTAL_COST_COL: u16 = 9;

/// Layout switches for an export
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Add a leading "Totals" sheet and an area title row on every sheet, so
    /// the workbook can be imported again.
    pub with_totals: bool,
}

/// A generated workbook, ready to be saved or sent
#[derive(Debug, Clone)]
pub struct ExportedWorkbook {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportedWorkbook {
    /// Write the workbook into `dir` under its own filename
    pub fn save_to(&self, dir: &Path) -> StockResult<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        info!("saved {}", path.display());
        Ok(path)
    }
}

/// `"<Building> Inventory - <YYYY-MM-DD>.xlsx"`
pub fn export_filename(building_name: &str, date: NaiveDate) -> String {
    format!("{} Inventory - {}.xlsx", building_name, date.format("%Y-%m-%d"))
}

/// Area name cut to the sheet-name limit. Collisions are left to the writer.
pub fn sheet_name(area_name: &str) -> String {
    area_name.chars().take(MAX_SHEET_NAME_CHARS).collect()
}

fn export_err(what: &'static str) -> impl Fn(XlsxError) -> StockError {
    move |e| StockError::Export(format!("Failed to {}: {}", what, e))
}

/// Excel exporter for one building's snapshot on one date
#[derive(Debug, Default)]
pub struct InventoryExporter {
    options: ExportOptions,
}

impl InventoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Build the workbook for `areas`. An empty snapshot is an
    /// `EmptyExportTarget` error and produces nothing.
    pub fn export(
        &self,
        areas: &[Area],
        building_name: &str,
        date: NaiveDate,
    ) -> StockResult<ExportedWorkbook> {
        if areas.is_empty() {
            return Err(StockError::EmptyExportTarget {
                building: building_name.to_string(),
                date,
            });
        }

        let currency = Format::new().set_num_format(CURRENCY_FORMAT);
        let mut workbook = Workbook::new();

        if self.options.with_totals {
            self.write_totals_sheet(&mut workbook, areas, &currency)?;
        }

        for area in areas {
            self.write_area_sheet(&mut workbook, area, &currency)?;
        }

        let bytes = workbook
            .save_to_buffer()
            .map_err(export_err("generate workbook"))?;

        let filename = export_filename(building_name, date);
        info!(
            areas = areas.len(),
            bytes = bytes.len(),
            "exported {}",
            filename
        );
        Ok(ExportedWorkbook { filename, bytes })
    }

    fn write_area_sheet(
        &self,
        workbook: &mut Workbook,
        area: &Area,
        currency: &Format,
    ) -> StockResult<()> {
        let name = sheet_name(&area.name);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name).map_err(|e| {
            StockError::Export(format!("Failed to name sheet '{}': {}", name, e))
        })?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet
                .set_column_width(col as u16, *width)
                .map_err(export_err("set column width"))?;
        }

        // Full area name; truncated sheet names still import by this cell.
        let mut row: u32 = 0;
        if self.options.with_totals {
            worksheet
                .write_string(row, 0, &area.name)
                .map_err(export_err("write area title"))?;
            row += 1;
        }

        for (col, title) in HEADER.iter().enumerate() {
            worksheet
                .write_string(row, col as u16, *title)
                .map_err(export_err("write header"))?;
        }
        row += 1;

        for item in &area.items {
            write_item_row(worksheet, row, item, currency)?;
            row += 1;
        }

        if self.options.with_totals {
            worksheet
                .write_string(row, 0, "Total:")
                .map_err(export_err("write total row"))?;
            worksheet
                .write_number_with_format(row, TOTAL_COST_COL, area.total_value(), currency)
                .map_err(export_err("write total row"))?;
        }

        debug!("sheet '{}': {} items", name, area.items.len());
        Ok(())
    }

    fn write_totals_sheet(
        &self,
        workbook: &mut Workbook,
        areas: &[Area],
        currency: &Format,
    ) -> StockResult<()> {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(TOTALS_SHEET)
            .map_err(export_err("name totals sheet"))?;
        worksheet
            .set_column_width(0, 40.0)
            .map_err(export_err("set column width"))?;
        worksheet
            .set_column_width(1, 15.0)
            .map_err(export_err("set column width"))?;

        worksheet
            .write_string(0, 0, "Inventories")
            .map_err(export_err("write totals header"))?;
        worksheet
            .write_string(0, 1, "Totals")
            .map_err(export_err("write totals header"))?;

        let mut row: u32 = 1;
        for area in areas {
            worksheet
                .write_string(row, 0, &area.name)
                .map_err(export_err("write area total"))?;
            worksheet
                .write_number_with_format(row, 1, area.total_value(), currency)
                .map_err(export_err("write area total"))?;
            row += 1;
        }

        worksheet
            .write_string(row, 0, "Ending Inventory")
            .map_err(export_err("write ending inventory"))?;
        worksheet
            .write_number_with_format(row, 1, snapshot_total(areas), currency)
            .map_err(export_err("write ending inventory"))?;

        Ok(())
    }
}

fn write_item_row(
    worksheet: &mut Worksheet,
    row: u32,
    item: &LineItem,
    currency: &Format,
) -> StockResult<()> {
    let p = &item.product;
    let err = export_err("write item row");

    worksheet.write_string(row, 0, &p.supplier).map_err(&err)?;
    worksheet.write_string(row, 1, &p.brand).map_err(&err)?;
    worksheet.write_string(row, 2, &p.name).map_err(&err)?;
    worksheet.write_string(row, 3, &p.sku).map_err(&err)?;
    worksheet
        .write_number(row, 4, p.units_per_case as f64)
        .map_err(&err)?;
    worksheet.write_string(row, 5, &p.package_size).map_err(&err)?;
    worksheet
        .write_number_with_format(row, 6, p.case_price, currency)
        .map_err(&err)?;
    worksheet
        .write_number_with_format(row, 7, p.each_price, currency)
        .map_err(&err)?;
    worksheet.write_number(row, 8, item.count).map_err(&err)?;
    worksheet
        .write_number_with_format(row, TOTAL_COST_COL, item.total_value(), currency)
        .map_err(&err)?;
    worksheet
        .write_string(row, 10, item.count_unit.as_str())
        .map_err(&err)?;
    Ok(())
}
