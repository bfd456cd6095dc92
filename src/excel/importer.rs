//! Excel importer implementation - workbook bytes → inventory areas
//!
//! The uploaded workbook has no fixed sheet order or layout. A "Totals" sheet
//! names the areas and their order; each data sheet identifies its area in one
//! of its first rows and lists items below a `Company` header row. Products are
//! reconciled against the master catalog by SKU, and products seen for the
//! first time are added to the catalog as the rows are read.

use crate::error::{StockError, StockResult};
use crate::excel::cells::{
    cell_text, currency_cell, is_populated, normalize, number_cell, SheetRows,
};
use crate::types::{new_product_id, Area, CountUnit, LineItem, Product};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows of a data sheet searched for the area name
const AREA_NAME_ROWS: usize = 5;

/// Minimum number of populated cells for a row to count as an item
const MIN_ITEM_CELLS: usize = 3;

const PLACEHOLDER: &str = "N/A";

/// Item sheet columns, in order
mod col {
    pub const COMPANY: usize = 0;
    pub const BRAND: usize = 1;
    pub const DESCRIPTION: usize = 2;
    pub const ITEM_NUMBER: usize = 3;
    pub const CASE_QTY: usize = 4;
    pub const PACKAGE: usize = 5;
    pub const CASE_PRICE: usize = 6;
    pub const EACH_PRICE: usize = 7;
    pub const COUNT: usize = 8;
    pub const COUNT_AS: usize = 10;
}

/// A per-sheet or per-row problem that did not stop the import
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportWarning {
    /// None of the sheet's first rows named a known area
    UnmatchedDataSheet { sheet: String },
    /// The sheet matched an area but has no `Company` header row
    UnmatchedItemHeader { sheet: String },
    /// An item row without an item number or description (1-based row)
    MalformedRow { sheet: String, row: usize },
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportWarning::UnmatchedDataSheet { sheet } => {
                write!(f, "Could not determine area for sheet \"{}\"; skipped", sheet)
            }
            ImportWarning::UnmatchedItemHeader { sheet } => {
                write!(f, "Could not find item header in sheet \"{}\"; items skipped", sheet)
            }
            ImportWarning::MalformedRow { sheet, row } => write!(
                f,
                "Row {} of sheet \"{}\" has no item number or description; skipped",
                row, sheet
            ),
        }
    }
}

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Areas in the order the totals sheet lists them
    pub areas: Vec<Area>,
    /// The master catalog with newly discovered products appended
    pub products: Vec<Product>,
    /// Products created during this import (also present in `products`)
    pub new_products: usize,
    pub warnings: Vec<ImportWarning>,
}

impl ImportOutcome {
    pub fn item_count(&self) -> usize {
        self.areas.iter().map(|a| a.items.len()).sum()
    }
}

/// Master catalog plus a SKU index, grown as rows are read
struct CatalogAccumulator {
    products: Vec<Product>,
    by_sku: HashMap<String, usize>,
    created: usize,
}

impl CatalogAccumulator {
    fn new(products: &[Product]) -> Self {
        let mut by_sku = HashMap::with_capacity(products.len());
        for (idx, product) in products.iter().enumerate() {
            // First product wins for duplicate SKUs, like a front-to-back search
            by_sku.entry(product.sku.clone()).or_insert(idx);
        }
        Self {
            products: products.to_vec(),
            by_sku,
            created: 0,
        }
    }

    fn find(&self, sku: &str) -> Option<&Product> {
        self.by_sku.get(sku).map(|&idx| &self.products[idx])
    }

    fn insert(&mut self, product: Product) -> &Product {
        let idx = self.products.len();
        self.by_sku.insert(product.sku.clone(), idx);
        self.products.push(product);
        self.created += 1;
        &self.products[idx]
    }
}

/// Excel importer for inventory workbooks
pub struct InventoryImporter {
    catalog: Vec<Product>,
}

impl InventoryImporter {
    /// Create an importer that reconciles against the given master catalog
    pub fn new(catalog: &[Product]) -> Self {
        Self {
            catalog: catalog.to_vec(),
        }
    }

    /// Read a workbook file and import it
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> StockResult<ImportOutcome> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| StockError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        self.import(&bytes)
    }

    /// Import workbook bytes. Fails without side effects when the workbook has
    /// no totals sheet, no header row, or no importable items.
    pub fn import(&self, bytes: &[u8]) -> StockResult<ImportOutcome> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| StockError::Workbook(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        debug!(sheets = ?sheet_names, "opened workbook");

        let totals_name = sheet_names
            .iter()
            .find(|name| is_totals_sheet(name))
            .cloned()
            .ok_or(StockError::MissingTotalsSheet)?;

        let totals = read_sheet(&mut workbook, &totals_name)?;
        let area_names = area_order(&totals).ok_or_else(|| StockError::MissingHeaderRow {
            sheet: totals_name.clone(),
        })?;
        debug!(areas = ?area_names, "area order from '{}'", totals_name);

        let mut areas: Vec<Area> = area_names.iter().map(Area::new).collect();
        let area_keys: Vec<String> = area_names.iter().map(|n| normalize(n)).collect();

        let mut catalog = CatalogAccumulator::new(&self.catalog);
        let mut warnings = Vec::new();

        for sheet_name in sheet_names.iter().filter(|name| !is_totals_sheet(name)) {
            let rows = read_sheet(&mut workbook, sheet_name)?;

            let Some((area_row, area_idx)) = match_area(&rows, &area_keys) else {
                warn!("Could not determine area for sheet \"{}\". Skipping.", sheet_name);
                warnings.push(ImportWarning::UnmatchedDataSheet {
                    sheet: sheet_name.clone(),
                });
                continue;
            };

            // An area named "Company" must not be taken for the header
            let Some(header_row) = rows
                .rows_starting_with("company")
                .find(|&row| row != area_row)
            else {
                warn!("Could not find item header in sheet \"{}\". Skipping items.", sheet_name);
                warnings.push(ImportWarning::UnmatchedItemHeader {
                    sheet: sheet_name.clone(),
                });
                continue;
            };

            let items = parse_items(&rows, header_row + 1, sheet_name, &mut catalog, &mut warnings);
            debug!(
                "sheet '{}' → area '{}': {} items",
                sheet_name,
                areas[area_idx].name,
                items.len()
            );
            areas[area_idx].items.extend(items);
        }

        if areas.iter().all(|area| area.items.is_empty()) {
            return Err(StockError::NoValidItemsFound);
        }

        let outcome = ImportOutcome {
            areas,
            new_products: catalog.created,
            products: catalog.products,
            warnings,
        };
        info!(
            areas = outcome.areas.len(),
            items = outcome.item_count(),
            new_products = outcome.new_products,
            warnings = outcome.warnings.len(),
            "workbook imported"
        );
        Ok(outcome)
    }
}

/// Substring test, so a sheet named e.g. "Totals Backup" also counts
fn is_totals_sheet(name: &str) -> bool {
    normalize(name).contains("total")
}

fn read_sheet<RS>(workbook: &mut calamine::Sheets<RS>, name: &str) -> StockResult<SheetRows>
where
    RS: std::io::Read + std::io::Seek,
{
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| StockError::Workbook(format!("sheet '{}': {}", name, e)))?;
    Ok(SheetRows::from_range(&range))
}

/// Area names listed below the `Inventories | Totals` header, in order,
/// first appearance only. `None` when the header row is missing.
fn area_order(totals: &SheetRows) -> Option<Vec<String>> {
    let header = (0..totals.len())
        .find(|&row| totals.key(row, 0) == "inventories" && totals.key(row, 1) == "totals")?;

    let mut names: Vec<String> = Vec::new();
    for row in header + 1..totals.len() {
        let name = cell_text(totals.cell(row, 0)).trim().to_string();
        let key = normalize(&name);
        if key.is_empty() || key == "ending inventory" {
            continue;
        }
        if names.iter().any(|n| normalize(n) == key) {
            continue;
        }
        names.push(name);
    }
    Some(names)
}

/// Row and area index of the area named by the first cell of one of the
/// sheet's first rows
fn match_area(rows: &SheetRows, area_keys: &[String]) -> Option<(usize, usize)> {
    (0..rows.len().min(AREA_NAME_ROWS)).find_map(|row| {
        let key = rows.key(row, 0);
        if key.is_empty() {
            return None;
        }
        area_keys.iter().position(|k| *k == key).map(|idx| (row, idx))
    })
}

fn parse_items(
    rows: &SheetRows,
    start: usize,
    sheet_name: &str,
    catalog: &mut CatalogAccumulator,
    warnings: &mut Vec<ImportWarning>,
) -> Vec<LineItem> {
    let mut items = Vec::new();

    for row_idx in start..rows.len() {
        let row = rows.row(row_idx);
        let populated = row.iter().filter(|c| is_populated(c)).count();
        if populated < MIN_ITEM_CELLS || rows.key(row_idx, 0).starts_with("total:") {
            continue;
        }

        let text = |col: usize| cell_text(rows.cell(row_idx, col)).trim().to_string();
        let sku = text(col::ITEM_NUMBER);
        let description = text(col::DESCRIPTION);
        if sku.is_empty() || description.is_empty() {
            warnings.push(ImportWarning::MalformedRow {
                sheet: sheet_name.to_string(),
                row: row_idx + 1,
            });
            continue;
        }

        let product = match catalog.find(&sku).cloned() {
            Some(existing) => existing,
            None => {
                let product = product_from_row(rows, row_idx, sku, description);
                debug!("new product '{}' ({})", product.name, product.sku);
                catalog.insert(product).clone()
            }
        };

        let count = number_cell(rows.cell(row_idx, col::COUNT))
            .unwrap_or(0.0)
            .max(0.0);
        let count_unit = CountUnit::from_cell(&text(col::COUNT_AS));

        items.push(LineItem {
            product,
            count,
            count_unit,
        });
    }

    items
}

fn product_from_row(rows: &SheetRows, row: usize, sku: String, description: String) -> Product {
    let text_or_placeholder = |col: usize| {
        let value = cell_text(rows.cell(row, col)).trim().to_string();
        if value.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            value
        }
    };

    let case_qty = case_quantity(rows.cell(row, col::CASE_QTY));
    let case_price = currency_cell(rows.cell(row, col::CASE_PRICE));
    let each_price = match currency_cell(rows.cell(row, col::EACH_PRICE)) {
        price if price != 0.0 => price,
        _ => case_price / case_qty,
    };

    Product {
        id: new_product_id(),
        supplier: text_or_placeholder(col::COMPANY),
        brand: text_or_placeholder(col::BRAND),
        name: description,
        sku,
        package_size: text_or_placeholder(col::PACKAGE),
        units_per_case: units_per_case(case_qty),
        case_weight: 0.0,
        case_price,
        each_price,
    }
}

/// Case quantity as written; non-numeric, blank, zero or negative means one
fn case_quantity(cell: &Data) -> f64 {
    match number_cell(cell) {
        Some(qty) if qty > 0.0 => qty,
        _ => 1.0,
    }
}

/// Whole units per case, at least one. The each price is derived from the
/// unrounded quantity before this is applied.
fn units_per_case(case_qty: f64) -> u32 {
    if case_qty >= 1.0 {
        case_qty.round().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn item_row(sku: &str, description: &str, case_qty: Data, case_price: Data) -> Vec<Data> {
        vec![
            s("Sysco"),
            s("Prime Meats"),
            s(description),
            s(sku),
            case_qty,
            s("12 x 16oz"),
            case_price,
            Data::Empty,
            Data::Float(2.0),
            Data::Empty,
            s("case"),
        ]
    }

    #[test]
    fn test_is_totals_sheet_is_substring_and_case_insensitive() {
        assert!(is_totals_sheet("Totals"));
        assert!(is_totals_sheet("GRAND TOTAL"));
        assert!(is_totals_sheet("Totals Backup"));
        assert!(!is_totals_sheet("Main Freezer"));
    }

    #[test]
    fn test_area_order_skips_ending_inventory_blanks_and_duplicates() {
        let totals = SheetRows::from_rows(vec![
            vec![s("Inventory Summary")],
            vec![s("INVENTORIES"), s("Totals")],
            vec![s("Main Freezer"), Data::Float(100.0)],
            vec![Data::Empty, Data::Empty],
            vec![s("Walk-In Cooler"), Data::Float(50.0)],
            vec![s("main freezer"), Data::Float(1.0)],
            vec![s("Ending Inventory"), Data::Float(150.0)],
        ]);
        assert_eq!(
            area_order(&totals).unwrap(),
            vec!["Main Freezer".to_string(), "Walk-In Cooler".to_string()]
        );
    }

    #[test]
    fn test_area_order_requires_header() {
        let totals = SheetRows::from_rows(vec![vec![s("Inventories"), s("Amount")]]);
        assert!(area_order(&totals).is_none());
    }

    #[test]
    fn test_match_area_only_searches_first_five_rows() {
        let keys = vec!["main freezer".to_string()];
        let mut rows: Vec<Vec<Data>> = (0..5).map(|_| vec![s("notes")]).collect();
        rows.push(vec![s("Main Freezer")]);
        assert_eq!(match_area(&SheetRows::from_rows(rows.clone()), &keys), None);

        rows[4] = vec![s("  MAIN FREEZER ")];
        assert_eq!(match_area(&SheetRows::from_rows(rows), &keys), Some((4, 0)));
    }

    #[test]
    fn test_case_quantity_defaults_to_one() {
        assert_eq!(case_quantity(&Data::Float(12.0)), 12.0);
        assert_eq!(case_quantity(&s("24")), 24.0);
        assert_eq!(case_quantity(&s("dozen")), 1.0);
        assert_eq!(case_quantity(&Data::Empty), 1.0);
        assert_eq!(case_quantity(&Data::Float(0.0)), 1.0);
        assert_eq!(case_quantity(&Data::Float(-3.0)), 1.0);
        assert_eq!(case_quantity(&Data::Float(0.5)), 0.5);
    }

    #[test]
    fn test_units_per_case_rounds_to_at_least_one() {
        assert_eq!(units_per_case(12.0), 12);
        assert_eq!(units_per_case(2.5), 3);
        assert_eq!(units_per_case(0.5), 1);
    }

    #[test]
    fn test_fractional_case_quantity_keeps_unrounded_each_price() {
        let rows = SheetRows::from_rows(vec![
            item_row("SKU-7", "Half Wheel Parmesan", Data::Float(2.5), Data::Float(10.0)),
            item_row("SKU-8", "Saffron", Data::Float(0.5), Data::Float(10.0)),
        ]);
        let parmesan = product_from_row(&rows, 0, "SKU-7".into(), "Half Wheel Parmesan".into());
        assert_eq!(parmesan.units_per_case, 3);
        assert_eq!(parmesan.each_price, 4.0);

        let saffron = product_from_row(&rows, 1, "SKU-8".into(), "Saffron".into());
        assert_eq!(saffron.units_per_case, 1);
        assert_eq!(saffron.each_price, 20.0);
    }

    #[test]
    fn test_parse_items_derives_each_price_and_reuses_new_products() {
        let rows = SheetRows::from_rows(vec![
            vec![s("Company"), s("Brand"), s("Description")],
            item_row("SKU-5832", "Ribeye Steak", Data::Float(12.0), s("$240.00")),
            item_row("SKU-5832", "Ribeye Steak (dup)", Data::Float(6.0), s("$1.00")),
        ]);
        let mut catalog = CatalogAccumulator::new(&[]);
        let mut warnings = Vec::new();

        let items = parse_items(&rows, 1, "Freezer", &mut catalog, &mut warnings);

        assert_eq!(items.len(), 2);
        assert_eq!(catalog.created, 1);
        assert_eq!(items[0].product.each_price, 20.0);
        assert_eq!(items[0].product.case_price, 240.0);
        assert_eq!(items[0].product.id, items[1].product.id);
        assert_eq!(items[1].product.name, "Ribeye Steak");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_parse_items_skips_sparse_total_and_malformed_rows() {
        let rows = SheetRows::from_rows(vec![
            vec![s("Company")],
            vec![s("Sysco"), s("only two")],
            vec![s("TOTAL: Freezer"), Data::Empty, s("x"), s("y"), Data::Float(9.0)],
            vec![s("Sysco"), s("Brand"), Data::Empty, s("SKU-1"), Data::Float(1.0)],
            item_row("SKU-2", "Salmon Fillet", Data::Float(20.0), Data::Float(180.0)),
        ]);
        let mut catalog = CatalogAccumulator::new(&[]);
        let mut warnings = Vec::new();

        let items = parse_items(&rows, 1, "Freezer", &mut catalog, &mut warnings);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.sku, "SKU-2");
        assert_eq!(
            warnings,
            vec![ImportWarning::MalformedRow {
                sheet: "Freezer".to_string(),
                row: 4
            }]
        );
    }

    #[test]
    fn test_parse_items_matches_existing_catalog_by_sku() {
        let existing = Product {
            id: "prod-001".to_string(),
            supplier: "Sysco".to_string(),
            brand: "Prime Meats".to_string(),
            name: "Ribeye Steak".to_string(),
            sku: "5832".to_string(),
            package_size: "12 x 16oz".to_string(),
            units_per_case: 12,
            case_weight: 20.0,
            case_price: 240.0,
            each_price: 20.0,
        };
        let mut row = item_row("ignored", "Renamed Ribeye", Data::Float(1.0), s("$1"));
        row[col::ITEM_NUMBER] = Data::Float(5832.0);
        row[col::COUNT_AS] = s("Each");
        let rows = SheetRows::from_rows(vec![vec![s("company")], row]);

        let mut catalog = CatalogAccumulator::new(std::slice::from_ref(&existing));
        let mut warnings = Vec::new();
        let items = parse_items(&rows, 1, "Freezer", &mut catalog, &mut warnings);

        assert_eq!(catalog.created, 0);
        assert_eq!(items[0].product, existing);
        assert_eq!(items[0].count, 2.0);
        assert_eq!(items[0].count_unit, CountUnit::Each);
    }

    #[test]
    fn test_product_from_row_fills_placeholders() {
        let rows = SheetRows::from_rows(vec![vec![
            Data::Empty,
            Data::Empty,
            s("Mystery Item"),
            s("SKU-9"),
            s("n/a"),
        ]]);
        let p = product_from_row(&rows, 0, "SKU-9".to_string(), "Mystery Item".to_string());
        assert_eq!(p.supplier, "N/A");
        assert_eq!(p.brand, "N/A");
        assert_eq!(p.package_size, "N/A");
        assert_eq!(p.units_per_case, 1);
        assert_eq!(p.case_price, 0.0);
        assert_eq!(p.each_price, 0.0);
        assert_eq!(p.case_weight, 0.0);
    }

    #[test]
    fn test_import_rejects_non_workbook_bytes() {
        let importer = InventoryImporter::new(&[]);
        let err = importer.import(b"not a spreadsheet").unwrap_err();
        assert!(matches!(err, StockError::Workbook(_)));
    }

    #[test]
    fn test_warning_display() {
        let w = ImportWarning::UnmatchedDataSheet {
            sheet: "Sheet3".to_string(),
        };
        assert!(w.to_string().contains("Sheet3"));
    }
}
