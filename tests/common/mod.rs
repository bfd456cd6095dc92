//! Workbook fixtures shared by the integration tests

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;

pub enum Cell {
    T(&'static str),
    N(f64),
    Blank,
}

pub use Cell::{Blank, N, T};

/// Build an .xlsx in memory, one `(sheet name, rows)` pair per sheet
pub fn workbook(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    T(text) => {
                        sheet.write_string(r as u32, c as u16, *text).unwrap();
                    }
                    N(value) => {
                        sheet.write_number(r as u32, c as u16, *value).unwrap();
                    }
                    Blank => {}
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

pub fn item_header() -> Vec<Cell> {
    [
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
    ]
    .into_iter()
    .map(T)
    .collect()
}

/// Totals sheet listing `areas` in order
pub fn totals_sheet(areas: &[&'static str]) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![T("Inventories"), T("Totals")]];
    for area in areas {
        rows.push(vec![T(area), N(0.0)]);
    }
    rows.push(vec![T("Ending Inventory"), N(0.0)]);
    rows
}

/// Two-area count workbook with the freezer sheet placed before the cooler
/// sheet, while the totals sheet lists the cooler first
pub fn sample_counts() -> Vec<u8> {
    workbook(&[
        (
            "Freezer",
            vec![
                vec![T("Main Freezer")],
                item_header(),
                vec![
                    T("Sysco"),
                    T("Portico"),
                    T("Salmon Fillet"),
                    T("SKU-8899"),
                    N(20.0),
                    T("20 x 8oz"),
                    T("$180.00"),
                    Blank,
                    N(2.0),
                    Blank,
                    T("case"),
                ],
                vec![T("Total:"), Blank, Blank, Blank, Blank, Blank, Blank, Blank, Blank, N(360.0)],
            ],
        ),
        (
            "Cooler",
            vec![
                vec![T("Walk-In Cooler")],
                item_header(),
                vec![
                    T("US Foods"),
                    T("Glenview Farms"),
                    T("Heavy Cream"),
                    T("SKU-1122"),
                    N(12.0),
                    T("12 x 1qt"),
                    N(96.0),
                    N(8.0),
                    N(5.0),
                    Blank,
                    T("each"),
                ],
            ],
        ),
        ("Totals", totals_sheet(&["Walk-In Cooler", "Main Freezer"])),
    ])
}
